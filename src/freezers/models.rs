use chrono::{DateTime, Utc};
use crudcrate::{CRUDResource, EntityToModels};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, EntityToModels)]
#[sea_orm(table_name = "freezers")]
#[crudcrate(
    generate_router,
    api_struct = "Freezer",
    name_singular = "freezer",
    name_plural = "freezers",
    description = "Freezers belong to a facility and hold shelves, racks and loose boxes.",
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
    pub facility_id: Uuid,
    #[crudcrate(update_model = false, create_model = false, on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub created_at: DateTime<Utc>,
    #[crudcrate(update_model = false, create_model = false, on_update = chrono::Utc::now(), on_create = chrono::Utc::now(), sortable, list_model = false)]
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::facilities::models::Entity",
        from = "Column::FacilityId",
        to = "crate::facilities::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Facilities,
    #[sea_orm(has_many = "crate::shelves::models::Entity")]
    Shelves,
}

impl Related<crate::facilities::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Facilities.def()
    }
}

impl Related<crate::shelves::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shelves.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
