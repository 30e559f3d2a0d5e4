use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Ownership lookups
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_service_provider_user")
                    .table(ServiceProvider::Table)
                    .col(ServiceProvider::UserId)
                    .to_owned(),
            )
            .await?;

        // Default list ordering
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_service_provider_rating")
                    .table(ServiceProvider::Table)
                    .col(ServiceProvider::Rating)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_service_provider_status")
                    .table(ServiceProvider::Table)
                    .col(ServiceProvider::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_service_provider_status",
            "idx_service_provider_rating",
            "idx_service_provider_user",
        ] {
            manager
                .drop_index(Index::drop().name(name).table(ServiceProvider::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum ServiceProvider { Table, UserId, Rating, Status }
