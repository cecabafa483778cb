use std::sync::Arc;
use std::time::Duration;

use configs::{AllocatorConfig, RacePolicy};
use models::association::{validate_name, AssociationRecord};
use tracing::{debug, info, instrument, warn};

use crate::allocator::candidates::{CandidateSource, RandomCandidates};
use crate::errors::ServiceError;
use crate::observability::{
    ALLOCATION_ATTEMPTS, ASSOCIATIONS_TOTAL, IDS_MINTED_TOTAL, ID_COLLISIONS_TOTAL,
    ID_SPACE_EXHAUSTED_TOTAL, NAME_CLAIM_CONFLICTS_TOTAL,
};
use crate::storage::KeyValueStore;

/// Association records keyed by id.
pub type RecordTable = Arc<dyn KeyValueStore<AssociationRecord>>;
/// `name -> id` claims, written only with put-if-absent.
pub type NameIndex = Arc<dyn KeyValueStore<String>>;

#[derive(Debug, Clone, Copy)]
pub struct AssociatorSettings {
    pub policy: RacePolicy,
    pub max_attempts: u32,
    pub request_timeout: Duration,
}

impl From<&AllocatorConfig> for AssociatorSettings {
    fn from(cfg: &AllocatorConfig) -> Self {
        Self {
            policy: cfg.race_policy,
            max_attempts: cfg.max_attempts,
            request_timeout: Duration::from_millis(cfg.request_timeout_ms),
        }
    }
}

impl Default for AssociatorSettings {
    fn default() -> Self { Self::from(&AllocatorConfig::default()) }
}

/// Links a name to a set of member ids under a canonical identifier.
pub struct Associator {
    records: RecordTable,
    names: NameIndex,
    candidates: Arc<dyn CandidateSource>,
    settings: AssociatorSettings,
}

impl Associator {
    pub fn new(
        records: RecordTable,
        names: NameIndex,
        candidates: Arc<dyn CandidateSource>,
        settings: AssociatorSettings,
    ) -> Self {
        Self { records, names, candidates, settings }
    }

    /// Random candidates over the configured id range.
    pub fn from_config(records: RecordTable, names: NameIndex, cfg: &AllocatorConfig) -> Self {
        let candidates = Arc::new(RandomCandidates::new(cfg.id_min, cfg.id_max));
        Self::new(records, names, candidates, AssociatorSettings::from(cfg))
    }

    pub fn settings(&self) -> &AssociatorSettings { &self.settings }

    /// Find-or-create the record for `name` and overwrite its members.
    #[instrument(skip(self, member_ids), fields(policy = ?self.settings.policy, members = member_ids.len()))]
    pub async fn associate(&self, name: &str, member_ids: Vec<String>) -> Result<AssociationRecord, ServiceError> {
        validate_name(name)?;
        let record = match self.settings.policy {
            RacePolicy::Inherit => self.associate_inherited(name, member_ids).await?,
            RacePolicy::Guarded => self.associate_guarded(name, member_ids).await?,
        };
        ASSOCIATIONS_TOTAL.inc();
        Ok(record)
    }

    /// `associate` bounded by `deadline`; outstanding store calls are dropped on expiry.
    pub async fn associate_within(
        &self,
        name: &str,
        member_ids: Vec<String>,
        deadline: Duration,
    ) -> Result<AssociationRecord, ServiceError> {
        tokio::time::timeout(deadline, self.associate(name, member_ids))
            .await
            .map_err(|_| ServiceError::Timeout(deadline))?
    }

    pub async fn get(&self, id: &str) -> Result<AssociationRecord, ServiceError> {
        self.records.get(id).await?.ok_or_else(|| ServiceError::not_found("tracking location"))
    }

    async fn associate_inherited(&self, name: &str, member_ids: Vec<String>) -> Result<AssociationRecord, ServiceError> {
        let id = match self.find_by_name(name).await? {
            Some(id) => {
                debug!(%id, "reusing id bound to name");
                id
            }
            None => self.mint_unchecked().await?,
        };
        self.overwrite(id, name, member_ids).await
    }

    async fn associate_guarded(&self, name: &str, member_ids: Vec<String>) -> Result<AssociationRecord, ServiceError> {
        if let Some(id) = self.canonical_id(name).await? {
            debug!(%id, "reusing id bound to name");
            return self.overwrite(id, name, member_ids).await;
        }

        let reserved = self.reserve(name, &member_ids).await?;
        let reservation = Reservation::new(self.records.clone(), reserved.id.clone());
        let claimed = match self.names.put_if_absent(name.to_string(), reserved.id.clone()).await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!(reserved = %reserved.id, error = %e, "name claim failed; releasing reserved id");
                if let Err(cleanup) = reservation.release().await {
                    warn!(error = %cleanup, "reserved id not released; retrying in background");
                }
                return Err(e);
            }
        };
        if claimed {
            reservation.keep();
            info!(id = %reserved.id, "association created");
            return Ok(reserved);
        }

        // Another caller claimed the name between our lookup and our claim.
        NAME_CLAIM_CONFLICTS_TOTAL.inc();
        let winner = self
            .names
            .get(name)
            .await?
            .ok_or_else(|| ServiceError::Store(format!("name index entry for {name:?} vanished")))?;
        if winner == reserved.id {
            reservation.keep();
        } else {
            warn!(reserved = %reserved.id, %winner, "lost name claim; releasing reserved id");
            reservation.release().await?;
        }
        self.overwrite(winner, name, member_ids).await
    }

    /// Index lookup first, trusted only while the indexed record still carries
    /// `name`. Records that predate the index are found by scan and back-filled.
    async fn canonical_id(&self, name: &str) -> Result<Option<String>, ServiceError> {
        if let Some(id) = self.names.get(name).await? {
            match self.records.get(&id).await? {
                Some(r) if r.name == name => return Ok(Some(id)),
                _ => {
                    warn!(%id, "name index entry is stale; dropping it");
                    self.names.delete(name).await?;
                }
            }
        }
        let Some(id) = self.find_by_name(name).await? else {
            return Ok(None);
        };
        if self.names.put_if_absent(name.to_string(), id.clone()).await? {
            return Ok(Some(id));
        }
        Ok(Some(self.names.get(name).await?.unwrap_or(id)))
    }

    /// First record whose name matches, in scan order.
    async fn find_by_name(&self, name: &str) -> Result<Option<String>, ServiceError> {
        let same_name = |r: &AssociationRecord| r.name == name;
        let matches = self.records.scan(&same_name).await?;
        if matches.len() > 1 {
            warn!(count = matches.len(), "several records share this name; using the first");
        }
        Ok(matches.into_iter().next().map(|(_, r)| r.id))
    }

    /// Draw-and-check with no reservation; the id can still be taken between
    /// the check and the caller's write.
    async fn mint_unchecked(&self) -> Result<String, ServiceError> {
        for attempt in 1..=self.settings.max_attempts {
            let candidate = self.candidates.next_candidate().to_string();
            if self.records.get(&candidate).await?.is_none() {
                self.record_minted(&candidate, attempt);
                return Ok(candidate);
            }
            ID_COLLISIONS_TOTAL.inc();
            debug!(%candidate, attempt, "candidate id occupied");
        }
        Err(self.exhausted())
    }

    /// Draw-and-check, then claim the candidate with a conditional write of the
    /// full record.
    async fn reserve(&self, name: &str, member_ids: &[String]) -> Result<AssociationRecord, ServiceError> {
        for attempt in 1..=self.settings.max_attempts {
            let candidate = self.candidates.next_candidate().to_string();
            if self.records.get(&candidate).await?.is_none() {
                let record = AssociationRecord::new(candidate.clone(), name, member_ids.to_vec());
                if self.records.put_if_absent(candidate.clone(), record.clone()).await? {
                    self.record_minted(&candidate, attempt);
                    return Ok(record);
                }
            }
            ID_COLLISIONS_TOTAL.inc();
            debug!(%candidate, attempt, "candidate id occupied");
        }
        Err(self.exhausted())
    }

    async fn overwrite(&self, id: String, name: &str, member_ids: Vec<String>) -> Result<AssociationRecord, ServiceError> {
        let record = AssociationRecord::new(id, name, member_ids);
        self.records.put(record.id.clone(), record.clone()).await?;
        info!(id = %record.id, "association stored");
        Ok(record)
    }

    fn record_minted(&self, id: &str, attempts: u32) {
        IDS_MINTED_TOTAL.inc();
        ALLOCATION_ATTEMPTS.observe(f64::from(attempts));
        debug!(%id, attempts, "fresh id allocated");
    }

    fn exhausted(&self) -> ServiceError {
        ID_SPACE_EXHAUSTED_TOTAL.inc();
        let (min, max) = self.candidates.bounds();
        let err = ServiceError::IdSpaceExhausted { attempts: self.settings.max_attempts, min, max };
        warn!(error = %err, "no free identifier found");
        err
    }
}

/// A freshly reserved record that is deleted again unless kept. Dropping it
/// armed (an error path, or the caller's deadline cancelling the future)
/// hands the delete to the runtime.
struct Reservation {
    records: RecordTable,
    id: String,
    armed: bool,
}

impl Reservation {
    fn new(records: RecordTable, id: String) -> Self {
        Self { records, id, armed: true }
    }

    fn keep(mut self) {
        self.armed = false;
    }

    async fn release(mut self) -> Result<(), ServiceError> {
        self.records.delete(&self.id).await?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let records = self.records.clone();
        let id = std::mem::take(&mut self.id);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = records.delete(&id).await {
                        warn!(%id, error = %e, "failed to release reserved id");
                    }
                });
            }
            Err(_) => warn!(%id, "no runtime to release reserved id"),
        }
    }
}
