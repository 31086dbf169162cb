use crate::m20260301_000001_create_storage_hierarchy::{
    Boxes, create_index, id_column, timestamp_column,
};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        manager
            .create_table(
                Table::create()
                    .table(SampleTypes::Table)
                    .if_not_exists()
                    .col(id_column(backend, SampleTypes::Id)?)
                    .col(
                        ColumnDef::new(SampleTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(timestamp_column(SampleTypes::CreatedAt))
                    .col(timestamp_column(SampleTypes::LastUpdated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SourceFiles::Table)
                    .if_not_exists()
                    .col(id_column(backend, SourceFiles::Id)?)
                    .col(ColumnDef::new(SourceFiles::Name).string().not_null())
                    .col(ColumnDef::new(SourceFiles::Description).text())
                    .col(timestamp_column(SourceFiles::CreatedAt))
                    .col(timestamp_column(SourceFiles::LastUpdated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SampleStatuses::Table)
                    .if_not_exists()
                    .col(id_column(backend, SampleStatuses::Id)?)
                    .col(
                        ColumnDef::new(SampleStatuses::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SampleStatuses::Description).text())
                    .col(timestamp_column(SampleStatuses::CreatedAt))
                    .col(timestamp_column(SampleStatuses::LastUpdated))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Samples::Table)
                    .if_not_exists()
                    .col(id_column(backend, Samples::Id)?)
                    .col(
                        ColumnDef::new(Samples::SampleId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Samples::ProtocolNumber).string())
                    .col(ColumnDef::new(Samples::ParticipantId).string())
                    .col(ColumnDef::new(Samples::Gender).string())
                    .col(ColumnDef::new(Samples::DateOfBirth).date())
                    .col(ColumnDef::new(Samples::DateSampled).date())
                    .col(ColumnDef::new(Samples::TimeSampled).string())
                    .col(ColumnDef::new(Samples::SampleCondition).string())
                    .col(ColumnDef::new(Samples::UserCreated).string())
                    .col(ColumnDef::new(Samples::VisitCode).string())
                    .col(ColumnDef::new(Samples::RequisitionId).string())
                    .col(ColumnDef::new(Samples::SampleTypeId).uuid())
                    .col(ColumnDef::new(Samples::SourceFileId).uuid())
                    .col(ColumnDef::new(Samples::SampleStatusId).uuid())
                    .col(timestamp_column(Samples::CreatedAt))
                    .col(timestamp_column(Samples::LastUpdated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_samples_sample_type_id")
                            .from(Samples::Table, Samples::SampleTypeId)
                            .to(SampleTypes::Table, SampleTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_samples_source_file_id")
                            .from(Samples::Table, Samples::SourceFileId)
                            .to(SourceFiles::Table, SourceFiles::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_samples_sample_status_id")
                            .from(Samples::Table, Samples::SampleStatusId)
                            .to(SampleStatuses::Table, SampleStatuses::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(id_column(backend, Notes::Id)?)
                    .col(ColumnDef::new(Notes::SampleId).string().not_null())
                    .col(ColumnDef::new(Notes::Author).string())
                    .col(ColumnDef::new(Notes::Text).text().not_null())
                    .col(timestamp_column(Notes::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notes_sample_id")
                            .from(Notes::Table, Notes::SampleId)
                            .to(Samples::Table, Samples::SampleId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One position per sample, one sample per (box, x, y)
        manager
            .create_table(
                Table::create()
                    .table(Positions::Table)
                    .if_not_exists()
                    .col(id_column(backend, Positions::Id)?)
                    .col(
                        ColumnDef::new(Positions::SampleId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Positions::BoxId).uuid().not_null())
                    .col(ColumnDef::new(Positions::XPosition).integer().not_null())
                    .col(ColumnDef::new(Positions::YPosition).integer().not_null())
                    .col(timestamp_column(Positions::CreatedAt))
                    .col(timestamp_column(Positions::LastUpdated))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_positions_sample_id")
                            .from(Positions::Table, Positions::SampleId)
                            .to(Samples::Table, Samples::SampleId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_positions_box_id")
                            .from(Positions::Table, Positions::BoxId)
                            .to(Boxes::Table, Boxes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_positions_box_slot")
                    .table(Positions::Table)
                    .col(Positions::BoxId)
                    .col(Positions::XPosition)
                    .col(Positions::YPosition)
                    .unique()
                    .to_owned(),
            )
            .await?;

        create_index(manager, "idx_notes_sample_id", Notes::Table, Notes::SampleId).await?;
        create_index(
            manager,
            "idx_samples_sample_status_id",
            Samples::Table,
            Samples::SampleStatusId,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Positions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Samples::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SampleStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SourceFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SampleTypes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SampleTypes {
    Table,
    Id,
    Name,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum SourceFiles {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum SampleStatuses {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Samples {
    Table,
    Id,
    SampleId,
    ProtocolNumber,
    ParticipantId,
    Gender,
    DateOfBirth,
    DateSampled,
    TimeSampled,
    SampleCondition,
    UserCreated,
    VisitCode,
    RequisitionId,
    SampleTypeId,
    SourceFileId,
    SampleStatusId,
    CreatedAt,
    LastUpdated,
}

#[derive(DeriveIden)]
enum Notes {
    Table,
    Id,
    SampleId,
    Author,
    Text,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Positions {
    Table,
    Id,
    SampleId,
    BoxId,
    XPosition,
    YPosition,
    CreatedAt,
    LastUpdated,
}
