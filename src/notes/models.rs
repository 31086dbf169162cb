use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "notes")]
#[schema(as = Note)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sample_id: String,
    pub author: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::samples::models::Entity",
        from = "Column::SampleId",
        to = "crate::samples::models::Column::SampleId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Samples,
}

impl Related<crate::samples::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Samples.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub type Note = Model;

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct NoteCreate {
    pub author: Option<String>,
    pub text: String,
}
