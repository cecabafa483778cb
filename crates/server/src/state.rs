use std::sync::Arc;

use configs::AppConfig;
use service::allocator::Associator;
use service::competency_service::CompetencyService;
use service::runtime::Tables;

/// Shared handler state; every handler returns its own result value.
#[derive(Clone)]
pub struct ServerState {
    pub associator: Arc<Associator>,
    pub competencies: Arc<CompetencyService>,
    pub valid_roles: Arc<Vec<String>>,
}

impl ServerState {
    pub fn from_tables(tables: Tables, cfg: &AppConfig) -> Self {
        let associator = Associator::from_config(
            tables.tracking_locations,
            tables.tracking_location_names,
            &cfg.allocator,
        );
        Self {
            associator: Arc::new(associator),
            competencies: Arc::new(CompetencyService::new(tables.competencies)),
            valid_roles: Arc::new(cfg.auth.valid_roles.clone()),
        }
    }
}
