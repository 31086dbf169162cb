use crate::common::errors::BusinessError;
use crate::containment::models::{ParentRef, settled};
use crate::positions::models::{FALLBACK_BOX_CAPACITY, MAX_BOX_CAPACITY};
use crate::positions::services::occupied_positions;
use crate::validation_error;
use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use sea_orm::{IntoActiveModel, entity::prelude::*};

/// Nominal slot count of a newly created box
pub const DEFAULT_BOX_CAPACITY: i32 = 100;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "boxes")]
#[crudcrate(
    generate_router,
    api_struct = "StorageBox",
    name_singular = "box",
    name_plural = "boxes",
    description = "Boxes hold samples in a lettered grid. A box hangs from at most one of a rack, a shelf or a freezer.",
    fn_create = create_box,
    fn_update = update_box,
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[crudcrate(primary_key, update_model = false, create_model = false, on_create = Uuid::new_v4())]
    pub id: Uuid,
    #[crudcrate(sortable, filterable, fulltext)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    #[crudcrate(sortable, filterable, fulltext, list_model = false)]
    pub description: Option<String>,
    #[crudcrate(sortable, filterable)]
    pub capacity: Option<i32>,
    #[crudcrate(sortable, filterable)]
    pub rack_id: Option<Uuid>,
    #[crudcrate(sortable, filterable)]
    pub shelf_id: Option<Uuid>,
    #[crudcrate(sortable, filterable)]
    pub freezer_id: Option<Uuid>,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub created_at: DateTime<Utc>,
    #[crudcrate(update_model = false, create_model = false, on_update = chrono::Utc::now(), on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::racks::models::Entity",
        from = "Column::RackId",
        to = "crate::racks::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Racks,
    #[sea_orm(
        belongs_to = "crate::shelves::models::Entity",
        from = "Column::ShelfId",
        to = "crate::shelves::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Shelves,
    #[sea_orm(
        belongs_to = "crate::freezers::models::Entity",
        from = "Column::FreezerId",
        to = "crate::freezers::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Freezers,
    #[sea_orm(has_many = "crate::positions::models::Entity")]
    Positions,
}

impl Related<crate::racks::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Racks.def()
    }
}

impl Related<crate::shelves::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelves.def()
    }
}

impl Related<crate::freezers::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Freezers.def()
    }
}

impl Related<crate::positions::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Positions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stored attachment, rack first when a legacy row carries several
    pub fn parent(&self) -> ParentRef {
        ParentRef::from_columns(self.rack_id, self.shelf_id, self.freezer_id)
    }

    pub fn has_ambiguous_parent(&self) -> bool {
        ParentRef::is_ambiguous(self.rack_id, self.shelf_id, self.freezer_id)
    }
}

fn check_capacity(capacity: Option<i32>) -> Result<(), BusinessError> {
    match capacity {
        Some(value) if value <= 0 => Err(validation_error!(
            "capacity",
            "must be a positive number of slots"
        )),
        Some(value) if value > MAX_BOX_CAPACITY => Err(validation_error!(
            "capacity",
            format!("must be at most {MAX_BOX_CAPACITY} slots")
        )),
        _ => Ok(()),
    }
}

/// A box cannot shrink below a slot that holds a sample
pub(super) async fn check_shrink(
    db: &DatabaseConnection,
    box_id: Uuid,
    capacity: Option<i32>,
) -> Result<(), BusinessError> {
    let slot_count = capacity.unwrap_or(FALLBACK_BOX_CAPACITY);
    let outside = occupied_positions(db, box_id)
        .await?
        .into_iter()
        .map(|position| position.slot())
        .filter(|slot| !slot.is_within(slot_count))
        .max_by_key(|slot| slot.number());
    match outside {
        Some(slot) => Err(validation_error!(
            "capacity",
            format!("{slot} holds a sample and would fall outside {slot_count} slots")
        )),
        None => Ok(()),
    }
}

async fn create_box(
    db: &DatabaseConnection,
    mut create_data: StorageBoxCreate,
) -> Result<StorageBox, DbErr> {
    ParentRef::exclusive(
        create_data.rack_id,
        create_data.shelf_id,
        create_data.freezer_id,
    )
    .map_err(BusinessError::into_db_err)?;
    check_capacity(create_data.capacity).map_err(BusinessError::into_db_err)?;

    create_data.capacity = Some(create_data.capacity.unwrap_or(DEFAULT_BOX_CAPACITY));
    let active_model: ActiveModel = create_data.into();
    let inserted = active_model.insert(db).await?;
    Ok(inserted.into())
}

async fn update_box(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: StorageBoxUpdate,
) -> Result<StorageBox, DbErr> {
    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Box with id '{id}' not found")))?;

    let merged = update_data.merge_into_activemodel(existing.into_active_model())?;
    ParentRef::exclusive(
        settled(&merged.rack_id),
        settled(&merged.shelf_id),
        settled(&merged.freezer_id),
    )
    .map_err(BusinessError::into_db_err)?;
    if let ActiveValue::Set(capacity) = &merged.capacity {
        check_capacity(*capacity).map_err(BusinessError::into_db_err)?;
        check_shrink(db, id, *capacity)
            .await
            .map_err(BusinessError::into_db_err)?;
    }

    let updated = merged.update(db).await?;
    Ok(updated.into())
}
