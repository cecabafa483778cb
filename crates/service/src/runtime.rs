//! Runtime environment helpers
//!
//! Opens the tables named by the storage configuration so binaries and
//! tests share one wiring path.

use std::path::{Path, PathBuf};

use configs::{StorageBackend, StorageConfig};
use models::{association::AssociationRecord, competency::Competency};
use tracing::info;

use crate::allocator::{NameIndex, RecordTable};
use crate::competency_service::CompetencyTable;
use crate::storage::{JsonMapStore, MemoryStore};

pub const COMPETENCIES_TABLE: &str = "competencies";
pub const TRACKING_LOCATIONS_TABLE: &str = "tracking_locations_to_competencies";
pub const TRACKING_LOCATION_NAMES_TABLE: &str = "tracking_location_names";

#[derive(Clone)]
pub struct Tables {
    pub competencies: CompetencyTable,
    pub tracking_locations: RecordTable,
    pub tracking_location_names: NameIndex,
}

impl Tables {
    pub fn in_memory() -> Self {
        Self {
            competencies: MemoryStore::<Competency>::new(),
            tracking_locations: MemoryStore::<AssociationRecord>::new(),
            tracking_location_names: MemoryStore::<String>::new(),
        }
    }
}

pub fn table_path(data_dir: impl AsRef<Path>, table: &str) -> PathBuf {
    data_dir.as_ref().join(format!("{table}.json"))
}

/// Ensure the data directory exists.
pub async fn ensure_env(data_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_data_dir(data_dir).await
}

pub async fn open_tables(cfg: &StorageConfig) -> anyhow::Result<Tables> {
    match cfg.backend {
        StorageBackend::Memory => {
            info!("using in-memory tables");
            Ok(Tables::in_memory())
        }
        StorageBackend::File => {
            ensure_env(&cfg.data_dir).await?;
            let dir = &cfg.data_dir;
            let competencies: CompetencyTable =
                JsonMapStore::<Competency>::new(table_path(dir, COMPETENCIES_TABLE)).await?;
            let tracking_locations: RecordTable =
                JsonMapStore::<AssociationRecord>::new(table_path(dir, TRACKING_LOCATIONS_TABLE)).await?;
            let tracking_location_names: NameIndex =
                JsonMapStore::<String>::new(table_path(dir, TRACKING_LOCATION_NAMES_TABLE)).await?;
            info!(data_dir = %dir, "using JSON file tables");
            Ok(Tables { competencies, tracking_locations, tracking_location_names })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KeyValueStore;

    #[tokio::test]
    async fn file_tables_are_created_under_data_dir() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("ct_tables_{}", uuid::Uuid::new_v4()));
        let cfg = StorageConfig { backend: StorageBackend::File, data_dir: dir.to_string_lossy().to_string() };
        let tables = open_tables(&cfg).await?;
        tables
            .tracking_locations
            .put("1".into(), AssociationRecord::new("1", "Gym", vec![]))
            .await?;
        assert!(tokio::fs::metadata(table_path(&dir, TRACKING_LOCATIONS_TABLE)).await.is_ok());
        assert!(tokio::fs::metadata(table_path(&dir, COMPETENCIES_TABLE)).await.is_ok());

        let reopened = open_tables(&cfg).await?;
        assert!(reopened.tracking_locations.get("1").await?.is_some());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
