use crate::common::errors::BusinessResult;
use crate::validation_error;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Columns per box row; rows are lettered A, B, C ...
pub const BOX_GRID_COLUMNS: i32 = 10;

/// Slot bound used for boxes whose capacity was never recorded
pub const FALLBACK_BOX_CAPACITY: i32 = 91;

/// Rows run from A to Z
pub const BOX_GRID_ROWS: i32 = 26;

/// Largest capacity whose every slot has a label
pub const MAX_BOX_CAPACITY: i32 = BOX_GRID_ROWS * BOX_GRID_COLUMNS;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "positions")]
#[schema(as = Position)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sample_id: String,
    pub box_id: Uuid,
    pub x_position: i32,
    pub y_position: i32,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::boxes::models::Entity",
        from = "Column::BoxId",
        to = "crate::boxes::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Boxes,
    #[sea_orm(
        belongs_to = "crate::samples::models::Entity",
        from = "Column::SampleId",
        to = "crate::samples::models::Column::SampleId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Samples,
}

impl Related<crate::boxes::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Boxes.def()
    }
}

impl Related<crate::samples::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Samples.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn slot(&self) -> Slot {
        Slot::new(self.x_position, self.y_position)
    }
}

/// A grid slot, stored 0-based: `x` is the column, `y` the row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct Slot {
    pub x: i32,
    pub y: i32,
}

impl Slot {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Slot for the 1-based running number `n` (row-major)
    pub fn from_number(n: i32) -> Self {
        Self {
            x: (n - 1) % BOX_GRID_COLUMNS,
            y: (n - 1) / BOX_GRID_COLUMNS,
        }
    }

    /// 1-based running number, the inverse of `from_number`
    pub fn number(self) -> i32 {
        self.y * BOX_GRID_COLUMNS + self.x + 1
    }

    /// Parse the external form: 1-based column and a row letter
    pub fn from_external(column: i32, row: &str) -> BusinessResult<Self> {
        if !(1..=BOX_GRID_COLUMNS).contains(&column) {
            return Err(validation_error!(
                "column",
                format!("must be between 1 and {BOX_GRID_COLUMNS}")
            ));
        }
        let mut letters = row.trim().chars();
        let y = match (letters.next(), letters.next()) {
            (Some(letter), None) if letter.is_ascii_alphabetic() => {
                i32::from(letter.to_ascii_uppercase() as u8 - b'A')
            }
            _ => return Err(validation_error!("row", "must be a single letter")),
        };
        Ok(Self { x: column - 1, y })
    }

    pub fn row_letter(self) -> char {
        u8::try_from(self.y)
            .ok()
            .filter(|y| i32::from(*y) < BOX_GRID_ROWS)
            .map_or('?', |y| char::from(b'A' + y))
    }

    /// External label such as "A1" (row letter, 1-based column)
    pub fn label(self) -> String {
        format!("{}{}", self.row_letter(), self.x + 1)
    }

    pub fn is_within(self, slot_count: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.x < BOX_GRID_COLUMNS && self.number() <= slot_count
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Position payload accepted from callers: 1-based column, row letter
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct PositionInput {
    pub box_id: Uuid,
    pub column: i32,
    pub row: String,
}

/// Where a sample sits, in both stored and external form
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PlacedPosition {
    pub sample_id: String,
    pub box_id: Uuid,
    pub x_position: i32,
    pub y_position: i32,
    pub label: String,
}

impl From<Model> for PlacedPosition {
    fn from(model: Model) -> Self {
        let label = model.slot().label();
        Self {
            sample_id: model.sample_id,
            box_id: model.box_id,
            x_position: model.x_position,
            y_position: model.y_position,
            label,
        }
    }
}

/// A slot with its label, as listed for a box
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SlotView {
    pub x_position: i32,
    pub y_position: i32,
    pub label: String,
    pub sample_id: Option<String>,
}

impl SlotView {
    pub fn free(slot: Slot) -> Self {
        Self {
            x_position: slot.x,
            y_position: slot.y,
            label: slot.label(),
            sample_id: None,
        }
    }
}

impl From<Model> for SlotView {
    fn from(model: Model) -> Self {
        let slot = model.slot();
        Self {
            x_position: slot.x,
            y_position: slot.y,
            label: slot.label(),
            sample_id: Some(model.sample_id),
        }
    }
}

/// Box grid listing: occupied slots with their samples and the free ones
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct BoxOccupancyView {
    pub box_id: Uuid,
    pub slot_count: i32,
    pub occupied: Vec<SlotView>,
    pub free: Vec<SlotView>,
}
