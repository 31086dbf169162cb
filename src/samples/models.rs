use crate::boxes::models::StorageBox;
use crate::containment::models::Containment;
use crate::positions::models::PlacedPosition;
use chrono::{DateTime, NaiveDate, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use sea_orm::{IntoActiveModel, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "samples")]
#[crudcrate(
    generate_router,
    api_struct = "Sample",
    name_singular = "sample",
    name_plural = "samples",
    description = "Biological samples. Saving a sample whose status is not a stored state frees its box position.",
    fn_update = update_sample,
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[sea_orm(unique)]
    #[crudcrate(sortable, filterable, fulltext)]
    pub sample_id: String,
    #[crudcrate(sortable, filterable, fulltext)]
    pub protocol_number: Option<String>,
    #[crudcrate(sortable, filterable, fulltext)]
    pub participant_id: Option<String>,
    #[crudcrate(filterable)]
    pub gender: Option<String>,
    #[crudcrate(sortable, list_model = false)]
    pub date_of_birth: Option<NaiveDate>,
    #[crudcrate(sortable)]
    pub date_sampled: Option<NaiveDate>,
    #[crudcrate(list_model = false)]
    pub time_sampled: Option<String>,
    #[crudcrate(filterable, list_model = false)]
    pub sample_condition: Option<String>,
    #[crudcrate(filterable, list_model = false)]
    pub user_created: Option<String>,
    #[crudcrate(sortable, filterable)]
    pub visit_code: Option<String>,
    #[crudcrate(filterable, list_model = false)]
    pub requisition_id: Option<String>,
    #[crudcrate(filterable)]
    pub sample_type_id: Option<Uuid>,
    #[crudcrate(filterable, list_model = false)]
    pub source_file_id: Option<Uuid>,
    #[crudcrate(filterable)]
    pub sample_status_id: Option<Uuid>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub created_at: DateTime<Utc>,
    #[crudcrate(update_model = false, create_model = false, on_update = chrono::Utc::now(), on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::sample_types::models::Entity",
        from = "Column::SampleTypeId",
        to = "crate::sample_types::models::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SampleTypes,
    #[sea_orm(
        belongs_to = "crate::source_files::models::Entity",
        from = "Column::SourceFileId",
        to = "crate::source_files::models::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SourceFiles,
    #[sea_orm(
        belongs_to = "crate::sample_statuses::models::Entity",
        from = "Column::SampleStatusId",
        to = "crate::sample_statuses::models::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    SampleStatuses,
    #[sea_orm(has_one = "crate::positions::models::Entity")]
    Positions,
    #[sea_orm(has_many = "crate::notes::models::Entity")]
    Notes,
}

impl Related<crate::sample_types::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleTypes.def()
    }
}

impl Related<crate::source_files::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceFiles.def()
    }
}

impl Related<crate::sample_statuses::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SampleStatuses.def()
    }
}

impl Related<crate::positions::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Positions.def()
    }
}

impl Related<crate::notes::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

async fn update_sample(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: SampleUpdate,
) -> Result<Sample, DbErr> {
    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Sample with id '{id}' not found")))?;

    let changes = update_data.merge_into_activemodel(existing.clone().into_active_model())?;
    let (saved, _) = super::services::save_sample(db, &existing, changes).await?;
    Ok(saved.into())
}

/// A sample with where it is stored
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SampleLocation {
    pub sample: Sample,
    pub status: Option<String>,
    pub position: Option<PlacedPosition>,
    pub storage_box: Option<StorageBox>,
    pub containment: Containment,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct StatusChange {
    pub sample_status_id: Option<Uuid>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct BulkStatusChange {
    pub sample_ids: Vec<String>,
    pub sample_status_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct StatusChangeReport {
    pub updated: Vec<String>,
    /// Samples whose position was freed by the change
    pub evicted: Vec<String>,
    pub not_found: Vec<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct InventorySummary {
    pub total_samples: u64,
    pub sample_types: u64,
    pub participants: u64,
    pub studies: u64,
}
