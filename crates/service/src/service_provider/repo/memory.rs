use std::collections::HashMap;

use chrono::Utc;
use models::service_provider::{Model, NewServiceProvider, ServiceProviderChanges};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::query::{compare_by, Filter, SortKey};
use crate::service_provider::repository::ServiceProviderRepository;

/// Process-local store for tests and `STORE=memory` runs.
#[derive(Default)]
pub struct InMemoryServiceProviderRepository {
    rows: RwLock<HashMap<Uuid, Model>>,
}

impl InMemoryServiceProviderRepository {
    pub fn new() -> Self { Self::default() }

    pub fn with_rows(rows: impl IntoIterator<Item = Model>) -> Self {
        Self { rows: RwLock::new(rows.into_iter().map(|m| (m.id, m)).collect()) }
    }

    /// Insert a fully built record as-is.
    pub async fn insert(&self, m: Model) {
        self.rows.write().await.insert(m.id, m);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait::async_trait]
impl ServiceProviderRepository for InMemoryServiceProviderRepository {
    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|m| filter.matches(m)).count() as u64)
    }

    async fn find(&self, filter: &Filter, sort: &[SortKey], skip: u64, limit: u64) -> Result<Vec<Model>, ServiceError> {
        let rows = self.rows.read().await;
        let mut hits: Vec<&Model> = rows.values().filter(|m| filter.matches(m)).collect();
        // HashMap order is arbitrary; make unsorted ties deterministic.
        hits.sort_by(|a, b| compare_by(sort, a, b).then_with(|| a.created_at.cmp(&b.created_at)).then_with(|| a.id.cmp(&b.id)));
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(hits.into_iter().skip(skip).take(limit).cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Model>, ServiceError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, input: NewServiceProvider) -> Result<Model, ServiceError> {
        input.validate()?;
        let m = input.into_model(Uuid::new_v4(), Utc::now().into());
        self.rows.write().await.insert(m.id, m.clone());
        Ok(m)
    }

    async fn update(&self, id: Uuid, changes: ServiceProviderChanges) -> Result<Model, ServiceError> {
        changes.validate()?;
        let mut rows = self.rows.write().await;
        let m = rows.get_mut(&id).ok_or_else(|| ServiceError::not_found("service provider", id))?;
        changes.apply_to(m, Utc::now().into());
        Ok(m.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
