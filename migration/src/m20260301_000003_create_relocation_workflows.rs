use crate::m20260301_000001_create_storage_hierarchy::{id_column, timestamp_column};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        // Pending multi-step relocations; the state column holds the serialized workflow
        manager
            .create_table(
                Table::create()
                    .table(RelocationWorkflows::Table)
                    .if_not_exists()
                    .col(id_column(backend, RelocationWorkflows::Id)?)
                    .col(ColumnDef::new(RelocationWorkflows::State).text().not_null())
                    .col(timestamp_column(RelocationWorkflows::CreatedAt))
                    .col(timestamp_column(RelocationWorkflows::LastUpdated))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RelocationWorkflows::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RelocationWorkflows {
    Table,
    Id,
    State,
    CreatedAt,
    LastUpdated,
}
