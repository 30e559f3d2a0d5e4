use models::service_provider::{self as sp, Model, NewServiceProvider, ServiceProviderChanges};
use sea_orm::{DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use tracing::error;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::query::{Filter, SortKey};
use crate::service_provider::repository::ServiceProviderRepository;

pub struct SeaOrmServiceProviderRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmServiceProviderRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn store_err(op: &'static str) -> impl Fn(sea_orm::DbErr) -> ServiceError {
    move |e| {
        error!(op, error = %e, "service provider store failure");
        ServiceError::Db(e.to_string())
    }
}

/// Requested keys first, then `created_at, id` so LIMIT/OFFSET pages never overlap on ties.
fn ordered_select(filter: &Filter, sort: &[SortKey]) -> Select<sp::Entity> {
    let mut q = sp::Entity::find().filter(filter.to_condition());
    for key in sort {
        let order = if key.descending { Order::Desc } else { Order::Asc };
        q = q.order_by(key.field.column(), order);
    }
    q.order_by(sp::Column::CreatedAt, Order::Asc).order_by(sp::Column::Id, Order::Asc)
}

#[async_trait::async_trait]
impl ServiceProviderRepository for SeaOrmServiceProviderRepository {
    async fn count(&self, filter: &Filter) -> Result<u64, ServiceError> {
        sp::Entity::find()
            .filter(filter.to_condition())
            .count(&self.db)
            .await
            .map_err(store_err("count"))
    }

    async fn find(&self, filter: &Filter, sort: &[SortKey], skip: u64, limit: u64) -> Result<Vec<Model>, ServiceError> {
        ordered_select(filter, sort)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(store_err("find"))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Model>, ServiceError> {
        sp::Entity::find_by_id(id).one(&self.db).await.map_err(store_err("get"))
    }

    async fn create(&self, input: NewServiceProvider) -> Result<Model, ServiceError> {
        Ok(sp::create(&self.db, input).await?)
    }

    async fn update(&self, id: Uuid, changes: ServiceProviderChanges) -> Result<Model, ServiceError> {
        sp::update(&self.db, id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("service provider", id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(sp::delete(&self.db, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ListParams;
    use crate::test_support::get_db;
    use models::service_provider::ProviderStatus;

    fn skip_db() -> bool {
        std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
    }

    async fn owner(db: &DatabaseConnection) -> Uuid {
        let email = format!("owner+{}@example.com", Uuid::new_v4());
        models::user::create(db, &email, "Owner", models::user::Role::Provider, "x".into())
            .await
            .unwrap()
            .id
    }

    #[test]
    fn ordering_ends_with_unique_tiebreak() {
        use sea_orm::{DbBackend, QueryTrait};
        let q = ListParams::from_pairs(std::iter::empty::<(&str, &str)>(), &configs::QueryConfig::default())
            .resolve()
            .unwrap();
        let sql = ordered_select(&q.filter, &q.sort).build(DbBackend::Postgres).to_string();
        assert!(
            sql.contains(r#"ORDER BY "service_provider"."rating" DESC, "service_provider"."created_at" ASC, "service_provider"."id" ASC"#),
            "{sql}"
        );
    }

    #[tokio::test]
    async fn crud_and_filtered_listing_roundtrip() -> anyhow::Result<()> {
        if skip_db() {
            return Ok(());
        }
        let db = get_db().await?;
        let repo = SeaOrmServiceProviderRepository::new(db.clone());
        let user_id = owner(&db).await;
        let category = format!("cat-{}", Uuid::new_v4());

        for (name, rating) in [("Low", 1.0), ("High", 4.5), ("Mid", 4.0)] {
            repo.create(NewServiceProvider {
                user_id,
                name: name.into(),
                description: None,
                category: Some(category.clone()),
                email: None,
                phone: None,
                address: None,
                rating,
                status: ProviderStatus::Active,
            })
            .await?;
        }

        let q = ListParams::from_pairs(
            [("category", category.as_str()), ("rating[gte]", "4")],
            &configs::QueryConfig::default(),
        )
        .resolve()?;
        assert_eq!(repo.count(&q.filter).await?, 2);
        let rows = repo.find(&q.filter, &q.sort, 0, 10).await?;
        let names: Vec<_> = rows.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["High", "Mid"]);

        let updated = repo
            .update(rows[0].id, ServiceProviderChanges { status: Some(ProviderStatus::Suspended), ..Default::default() })
            .await?;
        assert_eq!(updated.status, ProviderStatus::Suspended);

        assert!(repo.delete(rows[0].id).await?);
        assert!(repo.get(rows[0].id).await?.is_none());
        assert!(matches!(
            repo.update(rows[0].id, ServiceProviderChanges::default()).await,
            Err(ServiceError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn tied_ratings_page_without_overlap() -> anyhow::Result<()> {
        if skip_db() {
            return Ok(());
        }
        let db = get_db().await?;
        let repo = SeaOrmServiceProviderRepository::new(db.clone());
        let user_id = owner(&db).await;
        let category = format!("ties-{}", Uuid::new_v4());

        for i in 0..25 {
            repo.create(NewServiceProvider {
                user_id,
                name: format!("p{i:02}"),
                description: None,
                category: Some(category.clone()),
                email: None,
                phone: None,
                address: None,
                rating: 0.0,
                status: ProviderStatus::Active,
            })
            .await?;
        }

        let q = ListParams::from_pairs([("category", category.as_str())], &configs::QueryConfig::default()).resolve()?;
        let mut seen = std::collections::HashSet::new();
        for page in 0..3u64 {
            for m in repo.find(&q.filter, &q.sort, page * 10, 10).await? {
                assert!(seen.insert(m.id), "{} returned twice", m.name);
            }
        }
        assert_eq!(seen.len(), 25);
        Ok(())
    }
}
