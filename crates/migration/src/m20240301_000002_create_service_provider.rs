//! Create `service_provider` table with FK to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceProvider::Table)
                    .if_not_exists()
                    .col(uuid(ServiceProvider::Id).primary_key())
                    .col(uuid(ServiceProvider::UserId).not_null())
                    .col(string_len(ServiceProvider::Name, 100).not_null())
                    .col(ColumnDef::new(ServiceProvider::Description).text().null())
                    .col(ColumnDef::new(ServiceProvider::Category).text().null())
                    .col(ColumnDef::new(ServiceProvider::Email).string_len(255).null())
                    .col(ColumnDef::new(ServiceProvider::Phone).string_len(32).null())
                    .col(ColumnDef::new(ServiceProvider::Address).text().null())
                    .col(double(ServiceProvider::Rating).not_null().default(0.0))
                    .col(string_len(ServiceProvider::Status, 16).not_null().default("active"))
                    .col(boolean(ServiceProvider::IsVerified).not_null().default(false))
                    .col(timestamp_with_time_zone(ServiceProvider::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(ServiceProvider::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_provider_user")
                            .from(ServiceProvider::Table, ServiceProvider::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceProvider::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceProvider {
    Table,
    Id,
    UserId,
    Name,
    Description,
    Category,
    Email,
    Phone,
    Address,
    Rating,
    Status,
    IsVerified,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
