use crate::containment::models::{RackParent, settled};
use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels, traits::MergeIntoActiveModel};
use sea_orm::{IntoActiveModel, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "racks")]
#[crudcrate(
    generate_router,
    api_struct = "Rack",
    name_singular = "rack",
    name_plural = "racks",
    description = "Racks hold boxes. A rack stands on a shelf or directly inside a freezer, never both.",
    fn_create = create_rack,
    fn_update = update_rack,
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

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn parent(&self) -> Option<RackParent> {
        RackParent::from_columns(self.shelf_id, self.freezer_id)
    }
}

async fn create_rack(db: &DatabaseConnection, create_data: RackCreate) -> Result<Rack, DbErr> {
    RackParent::exclusive(create_data.shelf_id, create_data.freezer_id)
        .map_err(crate::common::errors::BusinessError::into_db_err)?;

    let active_model: ActiveModel = create_data.into();
    let inserted = active_model.insert(db).await?;
    Ok(inserted.into())
}

async fn update_rack(
    db: &DatabaseConnection,
    id: Uuid,
    update_data: RackUpdate,
) -> Result<Rack, DbErr> {
    let existing = Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("Rack with id '{id}' not found")))?;

    let merged = update_data.merge_into_activemodel(existing.into_active_model())?;
    RackParent::exclusive(settled(&merged.shelf_id), settled(&merged.freezer_id))
        .map_err(crate::common::errors::BusinessError::into_db_err)?;

    let updated = merged.update(db).await?;
    Ok(updated.into())
}
