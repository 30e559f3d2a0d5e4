use std::sync::Arc;

use configs::QueryConfig;
use models::service_provider::{Model, NewServiceProvider, ProviderStatus, ServiceProviderChanges};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::repository::ServiceProviderRepository;
use crate::access::Requester;
use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::query::ListParams;

const ENTITY: &str = "service provider";

/// Create payload. Owner and verification flag are not accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceProviderInput {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub status: Option<ProviderStatus>,
}

/// Update payload; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceProviderInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub status: Option<ProviderStatus>,
}

impl From<UpdateServiceProviderInput> for ServiceProviderChanges {
    fn from(i: UpdateServiceProviderInput) -> Self {
        ServiceProviderChanges {
            name: i.name,
            description: i.description,
            category: i.category,
            email: i.email,
            phone: i.phone,
            address: i.address,
            rating: i.rating,
            status: i.status,
            is_verified: None,
        }
    }
}

/// One page of (possibly projected) records.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderPage {
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub id: Uuid,
    pub name: String,
    pub status: ProviderStatus,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for StatusView {
    fn from(m: Model) -> Self {
        Self { id: m.id, name: m.name, status: m.status, updated_at: m.updated_at }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationView {
    pub id: Uuid,
    pub name: String,
    pub is_verified: bool,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for VerificationView {
    fn from(m: Model) -> Self {
        Self { id: m.id, name: m.name, is_verified: m.is_verified, updated_at: m.updated_at }
    }
}

/// Business operations behind the service provider endpoints.
pub struct ServiceProviderService {
    repo: Arc<dyn ServiceProviderRepository>,
    query: QueryConfig,
}

impl ServiceProviderService {
    pub fn new(repo: Arc<dyn ServiceProviderRepository>, query: QueryConfig) -> Self {
        Self { repo, query }
    }

    /// Filtered, sorted, paginated listing driven by raw query-string pairs.
    #[instrument(skip(self, pairs))]
    pub async fn list(&self, pairs: &[(String, String)]) -> Result<ProviderPage, ServiceError> {
        let params = ListParams::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())), &self.query);
        let q = params.resolve()?;

        let total = self.repo.count(&q.filter).await?;
        let skip = q.page.start_index();
        let rows = if skip >= total {
            Vec::new()
        } else {
            self.repo.find(&q.filter, &q.sort, skip, q.page.limit).await?
        };

        let data = rows
            .iter()
            .map(|m| match &q.projection {
                Some(p) => p.apply(m),
                None => serde_json::to_value(m).map_err(|e| ServiceError::Db(e.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProviderPage { count: data.len(), pagination: Pagination::build(q.page, total), data })
    }

    /// A malformed id is reported the same way as an absent one.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Model, ServiceError> {
        let uuid = Uuid::parse_str(id).map_err(|_| ServiceError::not_found(ENTITY, id))?;
        self.repo.get(uuid).await?.ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }

    #[instrument(skip(self, input), fields(user_id = %requester.id))]
    pub async fn create(&self, requester: Requester, input: CreateServiceProviderInput) -> Result<Model, ServiceError> {
        let new = NewServiceProvider {
            user_id: requester.id,
            name: input.name,
            description: input.description,
            category: input.category,
            email: input.email,
            phone: input.phone,
            address: input.address,
            rating: input.rating.unwrap_or(0.0),
            status: input.status.unwrap_or_default(),
        };
        new.validate()?;
        let created = self.repo.create(new).await?;
        info!(provider_id = %created.id, user_id = %requester.id, "service_provider_created");
        Ok(created)
    }

    #[instrument(skip(self, input), fields(user_id = %requester.id))]
    pub async fn update(
        &self,
        requester: Requester,
        id: &str,
        input: UpdateServiceProviderInput,
    ) -> Result<Model, ServiceError> {
        let existing = self.get(id).await?;
        self.guard(&requester, &existing, "update this service provider")?;
        let changes = ServiceProviderChanges::from(input);
        changes.validate()?;
        let updated = self.repo.update(existing.id, changes).await?;
        info!(provider_id = %updated.id, "service_provider_updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(user_id = %requester.id))]
    pub async fn delete(&self, requester: Requester, id: &str) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        self.guard(&requester, &existing, "delete this service provider")?;
        if !self.repo.delete(existing.id).await? {
            return Err(ServiceError::not_found(ENTITY, id));
        }
        info!(provider_id = %existing.id, "service_provider_deleted");
        Ok(())
    }

    /// Validates the body before touching the store.
    #[instrument(skip(self, body), fields(user_id = %requester.id))]
    pub async fn set_status(&self, requester: Requester, id: &str, body: &Value) -> Result<StatusView, ServiceError> {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .and_then(ProviderStatus::parse)
            .ok_or_else(|| {
                ServiceError::Validation(format!(
                    "status must be one of: {}",
                    ProviderStatus::ALLOWED.join(", ")
                ))
            })?;
        let existing = self.get(id).await?;
        self.guard(&requester, &existing, "update this service provider")?;
        let changes = ServiceProviderChanges { status: Some(status), ..Default::default() };
        let updated = self.repo.update(existing.id, changes).await?;
        info!(provider_id = %updated.id, status = %updated.status.as_str(), "service_provider_status_changed");
        Ok(updated.into())
    }

    /// Admin only; ownership grants nothing here.
    #[instrument(skip(self, body), fields(user_id = %requester.id))]
    pub async fn set_verification(
        &self,
        requester: Requester,
        id: &str,
        body: &Value,
    ) -> Result<VerificationView, ServiceError> {
        let verified = body
            .get("isVerified")
            .and_then(Value::as_bool)
            .ok_or_else(|| ServiceError::Validation("isVerified must be a boolean".into()))?;
        let existing = self.get(id).await?;
        if !requester.is_admin() {
            warn!(provider_id = %existing.id, "verification attempt by non-admin");
            return Err(ServiceError::forbidden(requester.id, "verify service providers"));
        }
        let changes = ServiceProviderChanges { is_verified: Some(verified), ..Default::default() };
        let updated = self.repo.update(existing.id, changes).await?;
        info!(provider_id = %updated.id, is_verified = updated.is_verified, "service_provider_verification_changed");
        Ok(updated.into())
    }

    fn guard(&self, requester: &Requester, record: &Model, action: &str) -> Result<(), ServiceError> {
        if requester.may_modify(record.user_id) {
            return Ok(());
        }
        warn!(provider_id = %record.id, owner = %record.user_id, "access denied");
        Err(ServiceError::forbidden(requester.id, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service_provider::repo::InMemoryServiceProviderRepository;
    use models::user::Role;
    use serde_json::json;

    struct Fixture {
        svc: ServiceProviderService,
        repo: Arc<InMemoryServiceProviderRepository>,
        owner: Requester,
        stranger: Requester,
        admin: Requester,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryServiceProviderRepository::new());
        Fixture {
            svc: ServiceProviderService::new(repo.clone(), QueryConfig::default()),
            repo,
            owner: Requester::new(Uuid::new_v4(), Role::Provider),
            stranger: Requester::new(Uuid::new_v4(), Role::User),
            admin: Requester::new(Uuid::new_v4(), Role::Admin),
        }
    }

    fn input(name: &str, rating: f64) -> CreateServiceProviderInput {
        CreateServiceProviderInput { name: name.into(), rating: Some(rating), ..Default::default() }
    }

    fn pairs(p: &[(&str, &str)]) -> Vec<(String, String)> {
        p.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn create_stamps_owner_and_defaults() {
        let f = fixture();
        let m = f.svc.create(f.owner, input("Acme", 3.0)).await.unwrap();
        assert_eq!(m.user_id, f.owner.id);
        assert_eq!(m.status, ProviderStatus::Active);
        assert!(!m.is_verified);

        let m = f.svc.create(f.owner, CreateServiceProviderInput { name: "Zero".into(), ..Default::default() }).await.unwrap();
        assert_eq!(m.rating, 0.0);
    }

    #[tokio::test]
    async fn create_validation_failure_stores_nothing() {
        let f = fixture();
        let err = f.svc.create(f.owner, input("Acme", 9.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = f.svc.create(f.owner, CreateServiceProviderInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "please add a name"));
        assert_eq!(f.repo.len().await, 0);
    }

    #[test]
    fn create_input_ignores_owner_and_verification_fields() {
        let i: CreateServiceProviderInput =
            serde_json::from_value(json!({"name": "A", "user": Uuid::new_v4(), "isVerified": true})).unwrap();
        assert_eq!(i.name, "A");
    }

    #[tokio::test]
    async fn list_defaults_to_rating_desc_first_page() {
        let f = fixture();
        for (i, r) in [2.0, 5.0, 1.0, 4.0].into_iter().enumerate() {
            f.svc.create(f.owner, input(&format!("p{i}"), r)).await.unwrap();
        }
        let page = f.svc.list(&[]).await.unwrap();
        assert_eq!(page.count, 4);
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.pagination.limit, 10);
        assert!(page.pagination.next.is_none() && page.pagination.prev.is_none());
        let ratings: Vec<f64> = page.data.iter().map(|v| v["rating"].as_f64().unwrap()).collect();
        assert_eq!(ratings, [5.0, 4.0, 2.0, 1.0]);
        assert!(page.data[0].get("description").is_some());
    }

    #[tokio::test]
    async fn list_filters_projects_and_pages() {
        let f = fixture();
        for i in 0..25 {
            f.svc.create(f.owner, input(&format!("p{i:02}"), (i % 6) as f64 * 0.9)).await.unwrap();
        }
        let page = f
            .svc
            .list(&pairs(&[("rating[gte]", "2"), ("select", "name,rating"), ("sort", "name"), ("page", "2"), ("limit", "5")]))
            .await
            .unwrap();
        // ratings 2.7, 3.6, 4.5 for i % 6 in {3, 4, 5}: 12 records
        assert_eq!(page.pagination.total, 12);
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.count, 5);
        assert_eq!(page.pagination.prev.map(|l| l.page), Some(1));
        assert_eq!(page.pagination.next.map(|l| l.page), Some(3));
        for v in &page.data {
            let obj = v.as_object().unwrap();
            assert_eq!(obj.len(), 3);
            assert!(obj["rating"].as_f64().unwrap() >= 2.0);
        }
    }

    #[tokio::test]
    async fn list_rejects_uncastable_filter() {
        let f = fixture();
        let err = f.svc.list(&pairs(&[("rating[gte]", "abc")])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    /// Rejects offsets and limits a BIGINT bind could not hold.
    struct BigintBoundedRepo(Arc<InMemoryServiceProviderRepository>);

    #[async_trait::async_trait]
    impl ServiceProviderRepository for BigintBoundedRepo {
        async fn count(&self, filter: &crate::query::Filter) -> Result<u64, ServiceError> {
            self.0.count(filter).await
        }
        async fn find(
            &self,
            filter: &crate::query::Filter,
            sort: &[crate::query::SortKey],
            skip: u64,
            limit: u64,
        ) -> Result<Vec<Model>, ServiceError> {
            assert!(i64::try_from(skip).is_ok(), "offset {skip} out of range");
            assert!(i64::try_from(limit).is_ok(), "limit {limit} out of range");
            self.0.find(filter, sort, skip, limit).await
        }
        async fn get(&self, id: Uuid) -> Result<Option<Model>, ServiceError> {
            self.0.get(id).await
        }
        async fn create(&self, input: NewServiceProvider) -> Result<Model, ServiceError> {
            self.0.create(input).await
        }
        async fn update(&self, id: Uuid, changes: ServiceProviderChanges) -> Result<Model, ServiceError> {
            self.0.update(id, changes).await
        }
        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn list_far_past_the_end_is_an_empty_page() {
        let inner = Arc::new(InMemoryServiceProviderRepository::new());
        let unbounded = QueryConfig { default_limit: 10, max_limit: None };
        let svc = ServiceProviderService::new(Arc::new(BigintBoundedRepo(inner)), unbounded);
        let owner = Requester::new(Uuid::new_v4(), Role::Provider);
        for i in 0..3 {
            svc.create(owner, input(&format!("p{i}"), 1.0)).await.unwrap();
        }

        let page = svc.list(&pairs(&[("page", "1000000000000000000"), ("limit", "100")])).await.unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.pagination.total, 3);
        assert!(page.pagination.next.is_none());

        let page = svc.list(&pairs(&[("limit", "18446744073709551615")])).await.unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.pagination.pages, 1);
    }

    #[tokio::test]
    async fn get_missing_or_malformed_is_not_found() {
        let f = fixture();
        assert!(matches!(f.svc.get(&Uuid::new_v4().to_string()).await, Err(ServiceError::NotFound(_))));
        let err = f.svc.get("not-an-id").await.unwrap_err();
        assert_eq!(err.to_string(), "service provider not found with id of not-an-id");
    }

    #[tokio::test]
    async fn update_by_stranger_is_forbidden_and_leaves_record() {
        let f = fixture();
        let m = f.svc.create(f.owner, input("Acme", 3.0)).await.unwrap();
        let id = m.id.to_string();
        let changes = UpdateServiceProviderInput { name: Some("Hijacked".into()), ..Default::default() };
        let err = f.svc.update(f.stranger, &id, changes.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert_eq!(f.svc.get(&id).await.unwrap().name, "Acme");

        let by_admin = f.svc.update(f.admin, &id, changes).await.unwrap();
        assert_eq!(by_admin.name, "Hijacked");
        assert_eq!(by_admin.user_id, f.owner.id);
    }

    #[tokio::test]
    async fn update_checks_existence_before_guard() {
        let f = fixture();
        let err = f.svc.update(f.stranger, &Uuid::new_v4().to_string(), Default::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_guarded() {
        let f = fixture();
        let id = f.svc.create(f.owner, input("Acme", 3.0)).await.unwrap().id.to_string();
        assert!(matches!(f.svc.delete(f.stranger, &id).await, Err(ServiceError::Forbidden(_))));
        f.svc.delete(f.owner, &id).await.unwrap();
        assert!(matches!(f.svc.get(&id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn set_status_validates_before_lookup() {
        let f = fixture();
        let m = f.svc.create(f.owner, input("Acme", 3.0)).await.unwrap();
        let id = m.id.to_string();

        let err = f.svc.set_status(f.owner, &id, &json!({"status": "deleted"})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(f.svc.get(&id).await.unwrap().status, ProviderStatus::Active);

        // invalid body wins over a missing record
        let err = f.svc.set_status(f.owner, "nope", &json!({})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let view = f.svc.set_status(f.owner, &id, &json!({"status": "suspended"})).await.unwrap();
        assert_eq!(view.status, ProviderStatus::Suspended);
        assert!(view.updated_at >= m.updated_at);
        let v = serde_json::to_value(&view).unwrap();
        assert_eq!(v.as_object().unwrap().len(), 4);
        assert!(v.get("updatedAt").is_some());

        let err = f.svc.set_status(f.stranger, &id, &json!({"status": "active"})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn set_verification_is_admin_only_and_strictly_boolean() {
        let f = fixture();
        let id = f.svc.create(f.owner, input("Acme", 3.0)).await.unwrap().id.to_string();

        for bad in [json!({"isVerified": "true"}), json!({"isVerified": 1}), json!({})] {
            let err = f.svc.set_verification(f.admin, &id, &bad).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }

        let err = f.svc.set_verification(f.owner, &id, &json!({"isVerified": true})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(!f.svc.get(&id).await.unwrap().is_verified);

        let view = f.svc.set_verification(f.admin, &id, &json!({"isVerified": true})).await.unwrap();
        assert!(view.is_verified);
        assert_eq!(serde_json::to_value(&view).unwrap()["isVerified"], true);
    }
}
