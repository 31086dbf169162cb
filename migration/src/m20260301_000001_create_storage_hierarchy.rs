use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Primary key column with a backend-appropriate default.
#[allow(clippy::match_wildcard_for_single_variants)]
pub(crate) fn id_column<T: IntoIden>(
    backend: sea_orm::DatabaseBackend,
    column: T,
) -> Result<ColumnDef, DbErr> {
    match backend {
        sea_orm::DatabaseBackend::Postgres => Ok(ColumnDef::new(column)
            .uuid()
            .not_null()
            .primary_key()
            .default(Expr::cust("uuid_generate_v4()"))
            .to_owned()),
        sea_orm::DatabaseBackend::Sqlite => {
            Ok(ColumnDef::new(column).uuid().not_null().primary_key().to_owned())
        }
        _ => Err(DbErr::Custom("Unsupported database backend".to_string())),
    }
}

pub(crate) async fn create_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    column: C,
) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
{
    manager
        .create_index(
            Index::create()
                .name(name)
                .table(table)
                .col(column)
                .to_owned(),
        )
        .await
}

pub(crate) fn timestamp_column<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        if backend == sea_orm::DatabaseBackend::Postgres {
            manager
                .get_connection()
                .execute_unprepared("CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\";")
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Facilities::Table)
                    .if_not_exists()
                    .col(id_column(backend, Facilities::Id)?)
                    .col(ColumnDef::new(Facilities::Name).string().not_null())
                    .col(timestamp_column(Facilities::CreatedAt))
                    .col(timestamp_column(Facilities::LastUpdated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Freezers::Table)
                    .if_not_exists()
                    .col(id_column(backend, Freezers::Id)?)
                    .col(ColumnDef::new(Freezers::Name).string().not_null())
                    .col(ColumnDef::new(Freezers::Description).text())
                    .col(ColumnDef::new(Freezers::FacilityId).uuid().not_null())
                    .col(timestamp_column(Freezers::CreatedAt))
                    .col(timestamp_column(Freezers::LastUpdated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_freezers_facility_id")
                            .from(Freezers::Table, Freezers::FacilityId)
                            .to(Facilities::Table, Facilities::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Shelves::Table)
                    .if_not_exists()
                    .col(id_column(backend, Shelves::Id)?)
                    .col(ColumnDef::new(Shelves::Name).string().not_null())
                    .col(ColumnDef::new(Shelves::Description).text())
                    .col(ColumnDef::new(Shelves::FreezerId).uuid().not_null())
                    .col(timestamp_column(Shelves::CreatedAt))
                    .col(timestamp_column(Shelves::LastUpdated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shelves_freezer_id")
                            .from(Shelves::Table, Shelves::FreezerId)
                            .to(Freezers::Table, Freezers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Racks hang off a shelf or directly off a freezer
        manager
            .create_table(
                Table::create()
                    .table(Racks::Table)
                    .if_not_exists()
                    .col(id_column(backend, Racks::Id)?)
                    .col(ColumnDef::new(Racks::Name).string().not_null())
                    .col(ColumnDef::new(Racks::Description).text())
                    .col(ColumnDef::new(Racks::ShelfId).uuid())
                    .col(ColumnDef::new(Racks::FreezerId).uuid())
                    .col(timestamp_column(Racks::CreatedAt))
                    .col(timestamp_column(Racks::LastUpdated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_racks_shelf_id")
                            .from(Racks::Table, Racks::ShelfId)
                            .to(Shelves::Table, Shelves::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_racks_freezer_id")
                            .from(Racks::Table, Racks::FreezerId)
                            .to(Freezers::Table, Freezers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Boxes hang off at most one of rack, shelf or freezer
        manager
            .create_table(
                Table::create()
                    .table(Boxes::Table)
                    .if_not_exists()
                    .col(id_column(backend, Boxes::Id)?)
                    .col(ColumnDef::new(Boxes::Name).string().not_null())
                    .col(ColumnDef::new(Boxes::Description).text())
                    .col(ColumnDef::new(Boxes::Capacity).integer().default(100))
                    .col(ColumnDef::new(Boxes::RackId).uuid())
                    .col(ColumnDef::new(Boxes::ShelfId).uuid())
                    .col(ColumnDef::new(Boxes::FreezerId).uuid())
                    .col(timestamp_column(Boxes::CreatedAt))
                    .col(timestamp_column(Boxes::LastUpdated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boxes_rack_id")
                            .from(Boxes::Table, Boxes::RackId)
                            .to(Racks::Table, Racks::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boxes_shelf_id")
                            .from(Boxes::Table, Boxes::ShelfId)
                            .to(Shelves::Table, Shelves::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_boxes_freezer_id")
                            .from(Boxes::Table, Boxes::FreezerId)
                            .to(Freezers::Table, Freezers::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        create_index(manager, "idx_freezers_facility_id", Freezers::Table, Freezers::FacilityId).await?;
        create_index(manager, "idx_shelves_freezer_id", Shelves::Table, Shelves::FreezerId).await?;
        create_index(manager, "idx_racks_shelf_id", Racks::Table, Racks::ShelfId).await?;
        create_index(manager, "idx_racks_freezer_id", Racks::Table, Racks::FreezerId).await?;
        create_index(manager, "idx_boxes_rack_id", Boxes::Table, Boxes::RackId).await?;
        create_index(manager, "idx_boxes_shelf_id", Boxes::Table, Boxes::ShelfId).await?;
        create_index(manager, "idx_boxes_freezer_id", Boxes::Table, Boxes::FreezerId).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Boxes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Racks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shelves::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Freezers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Facilities::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Facilities {
    Table,
    Id,
    Name,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
pub(crate) enum Freezers {
    Table,
    Id,
    Name,
    Description,
    FacilityId,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
pub(crate) enum Shelves {
    Table,
    Id,
    Name,
    Description,
    FreezerId,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
pub(crate) enum Racks {
    Table,
    Id,
    Name,
    Description,
    ShelfId,
    FreezerId,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
pub(crate) enum Boxes {
    Table,
    Id,
    Name,
    Description,
    Capacity,
    RackId,
    ShelfId,
    FreezerId,
    CreatedAt,
    LastUpdated,
}
