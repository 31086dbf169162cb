use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "shelves")]
#[crudcrate(
    generate_router,
    api_struct = "Shelf",
    name_singular = "shelf",
    name_plural = "shelves",
    description = "Shelves sit inside a freezer and hold racks and loose boxes.",
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
    pub freezer_id: Uuid,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub created_at: DateTime<Utc>,
    #[crudcrate(update_model = false, create_model = false, on_update = chrono::Utc::now(), on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::freezers::models::Entity",
        from = "Column::FreezerId",
        to = "crate::freezers::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Freezers,
}

impl Related<crate::freezers::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Freezers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
