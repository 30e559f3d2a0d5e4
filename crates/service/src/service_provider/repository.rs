use async_trait::async_trait;
use models::service_provider::{Model, NewServiceProvider, ServiceProviderChanges};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::query::{Filter, SortKey};

/// Record store for service providers.
///
/// `count` and `find` are independent round-trips; callers must not assume
/// they observe the same snapshot.
#[async_trait]
pub trait ServiceProviderRepository: Send + Sync {
    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError>;
    async fn find(&self, filter: &Filter, sort: &[SortKey], skip: u64, limit: u64) -> Result<Vec<Model>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Model>, ServiceError>;
    async fn create(&self, input: NewServiceProvider) -> Result<Model, ServiceError>;
    /// Fails with `NotFound` if the record vanished since it was read.
    async fn update(&self, id: Uuid, changes: ServiceProviderChanges) -> Result<Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}
