//! Batch loader: writes every item of a JSON array into a table.
//!
//! A bad item is logged and counted, it never stops the batch.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFailure {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub written: usize,
    pub failed: Vec<SeedFailure>,
}

impl SeedReport {
    pub fn is_clean(&self) -> bool { self.failed.is_empty() }
}

/// Parse the seed file body, which must be a JSON array.
pub fn parse_items(bytes: &[u8]) -> Result<Vec<Value>, ServiceError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(ServiceError::Validation("seed file must contain a JSON array".into())),
        Err(e) => Err(ServiceError::Validation(format!("seed file is not valid JSON: {e}"))),
    }
}

/// Put each item under the key returned by `key_of`.
pub async fn seed_table<V, F>(table: &dyn KeyValueStore<V>, items: Vec<Value>, key_of: F) -> SeedReport
where
    V: DeserializeOwned + Send + Sync + 'static,
    F: Fn(&V) -> Result<String, ServiceError>,
{
    let mut report = SeedReport::default();
    for (index, raw) in items.into_iter().enumerate() {
        match seed_one(table, raw, &key_of).await {
            Ok(()) => report.written += 1,
            Err(e) => {
                warn!(index, error = %e, "unable to add item");
                report.failed.push(SeedFailure { index, reason: e.to_string() });
            }
        }
    }
    info!(written = report.written, failed = report.failed.len(), "seed finished");
    report
}

async fn seed_one<V, F>(table: &dyn KeyValueStore<V>, raw: Value, key_of: &F) -> Result<(), ServiceError>
where
    V: DeserializeOwned + Send + Sync + 'static,
    F: Fn(&V) -> Result<String, ServiceError>,
{
    let item: V = serde_json::from_value(raw).map_err(|e| ServiceError::Validation(e.to_string()))?;
    let key = key_of(&item)?;
    table.put(key, item).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use models::association::AssociationRecord;
    use models::competency::{validate_competency_id, Competency};
    use serde_json::json;

    #[test]
    fn parse_requires_array() {
        assert_eq!(parse_items(b"[1, 2]").unwrap().len(), 2);
        assert!(parse_items(b"{\"a\": 1}").is_err());
        assert!(parse_items(b"nope").is_err());
    }

    #[tokio::test]
    async fn bad_items_are_reported_and_skipped() {
        let table = MemoryStore::<Competency>::new();
        let items = vec![
            json!({"CompetencyId": "1", "Domain": "Math"}),
            json!({"Domain": "Math"}),
            json!({"CompetencyId": "x1", "Domain": "Math"}),
            json!({"CompetencyId": "2", "Domain": "Art", "Name": "Drawing"}),
        ];
        let report = seed_table(table.as_ref(), items, |c: &Competency| {
            validate_competency_id(&c.competency_id)?;
            Ok(c.competency_id.clone())
        })
        .await;
        assert_eq!(report.written, 2);
        assert_eq!(report.failed.iter().map(|f| f.index).collect::<Vec<_>>(), vec![1, 2]);
        assert!(!report.is_clean());
        assert_eq!(table.len().await, 2);
    }

    #[tokio::test]
    async fn seeds_association_records() {
        let table = MemoryStore::<AssociationRecord>::new();
        let items = vec![json!({"id": "5", "name": "Gym", "memberIds": ["1"]})];
        let report = seed_table(table.as_ref(), items, |r: &AssociationRecord| {
            r.validate()?;
            Ok(r.id.clone())
        })
        .await;
        assert!(report.is_clean());
        assert_eq!(table.get("5").await.unwrap().unwrap().name, "Gym");
    }
}
