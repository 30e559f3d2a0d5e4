use std::sync::Arc;

use configs::AppConfig;
use sea_orm::DatabaseConnection;
use service::auth::repo::SeaOrmAuthRepository;
use service::auth::repository::memory::InMemoryAuthRepository;
use service::auth::service::AuthConfig;
use service::auth::AuthService;
use service::service_provider::repo::{InMemoryServiceProviderRepository, SeaOrmServiceProviderRepository};
use service::service_provider::ServiceProviderService;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub providers: Arc<ServiceProviderService>,
    pub auth: Arc<AuthService>,
}

impl ServerState {
    /// PostgreSQL-backed stores.
    pub fn with_database(db: DatabaseConnection, cfg: &AppConfig) -> Self {
        Self {
            providers: Arc::new(ServiceProviderService::new(
                Arc::new(SeaOrmServiceProviderRepository::new(db.clone())),
                cfg.query,
            )),
            auth: Arc::new(AuthService::new(Arc::new(SeaOrmAuthRepository::new(db)), AuthConfig::from(&cfg.auth))),
        }
    }

    /// Process-local stores; nothing survives a restart.
    pub fn in_memory(cfg: &AppConfig) -> Self {
        Self {
            providers: Arc::new(ServiceProviderService::new(
                Arc::new(InMemoryServiceProviderRepository::new()),
                cfg.query,
            )),
            auth: Arc::new(AuthService::new(Arc::new(InMemoryAuthRepository::default()), AuthConfig::from(&cfg.auth))),
        }
    }
}
