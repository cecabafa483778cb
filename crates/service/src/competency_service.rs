use std::sync::Arc;

use models::competency::{validate_competency_id, Competency, COMPETENCY_KEY};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::pagination::{paginate, Page, PageRequest};
use crate::storage::KeyValueStore;

pub type CompetencyTable = Arc<dyn KeyValueStore<Competency>>;

/// Read and delete operations over the competencies table.
pub struct CompetencyService {
    table: CompetencyTable,
}

impl CompetencyService {
    pub fn new(table: CompetencyTable) -> Self { Self { table } }

    /// Competencies matching `competency_id` and `domain`, one page at a time.
    #[instrument(skip(self, page))]
    pub async fn get(&self, competency_id: &str, domain: &str, page: &PageRequest) -> Result<Page<Competency>, ServiceError> {
        validate_competency_id(competency_id)?;
        let matches = |c: &Competency| c.competency_id == competency_id && c.domain == domain;
        let found = self.table.scan(&matches).await?;
        if found.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "a competency was not found with the given id - {competency_id}"
            )));
        }
        paginate(found, page, COMPETENCY_KEY)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, competency_id: &str, domain: &str) -> Result<(), ServiceError> {
        validate_competency_id(competency_id)?;
        match self.table.get(competency_id).await? {
            Some(c) if c.domain == domain => {}
            _ => {
                return Err(ServiceError::NotFound(format!(
                    "a competency was not found with the given id - {competency_id}"
                )))
            }
        }
        self.table.delete(competency_id).await?;
        info!(%competency_id, "competency deleted");
        Ok(())
    }

    pub async fn put(&self, competency: Competency) -> Result<(), ServiceError> {
        validate_competency_id(&competency.competency_id)?;
        self.table.put(competency.competency_id.clone(), competency).await
    }
}
