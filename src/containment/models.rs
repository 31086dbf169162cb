use crate::common::errors::BusinessResult;
use crate::{boxes, facilities, freezers, racks, shelves, validation_error};
use crate::capacity::models::CapacitySummary;
use crate::capacity::services::{aggregate_scope, occupancy_of};
use sea_orm::{ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Facility,
    Freezer,
    Shelf,
    Rack,
    Box,
}

impl ContainerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Facility => "facility",
            ContainerKind::Freezer => "freezer",
            ContainerKind::Shelf => "shelf",
            ContainerKind::Rack => "rack",
            ContainerKind::Box => "box",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container addressed by kind and id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ContainerRef {
    pub kind: ContainerKind,
    pub id: Uuid,
}

impl ContainerRef {
    pub fn new(kind: ContainerKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn facility(id: Uuid) -> Self {
        Self::new(ContainerKind::Facility, id)
    }

    pub fn freezer(id: Uuid) -> Self {
        Self::new(ContainerKind::Freezer, id)
    }

    pub fn shelf(id: Uuid) -> Self {
        Self::new(ContainerKind::Shelf, id)
    }

    pub fn rack(id: Uuid) -> Self {
        Self::new(ContainerKind::Rack, id)
    }

    pub fn storage_box(id: Uuid) -> Self {
        Self::new(ContainerKind::Box, id)
    }
}

/// Where a box hangs: at most one of rack, shelf or freezer.
///
/// The three nullable columns on `boxes` are only ever written through this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    Unattached,
    Rack(Uuid),
    Shelf(Uuid),
    Freezer(Uuid),
}

impl ParentRef {
    /// Read the columns of a stored row. Rack wins over shelf, shelf over freezer.
    pub fn from_columns(
        rack_id: Option<Uuid>,
        shelf_id: Option<Uuid>,
        freezer_id: Option<Uuid>,
    ) -> Self {
        match (rack_id, shelf_id, freezer_id) {
            (Some(rack), _, _) => ParentRef::Rack(rack),
            (None, Some(shelf), _) => ParentRef::Shelf(shelf),
            (None, None, Some(freezer)) => ParentRef::Freezer(freezer),
            (None, None, None) => ParentRef::Unattached,
        }
    }

    /// Build from user input, refusing more than one parent
    pub fn exclusive(
        rack_id: Option<Uuid>,
        shelf_id: Option<Uuid>,
        freezer_id: Option<Uuid>,
    ) -> BusinessResult<Self> {
        if Self::is_ambiguous(rack_id, shelf_id, freezer_id) {
            return Err(validation_error!(
                "parent",
                "a box can be attached to at most one of rack, shelf or freezer"
            ));
        }
        Ok(Self::from_columns(rack_id, shelf_id, freezer_id))
    }

    pub fn is_ambiguous(
        rack_id: Option<Uuid>,
        shelf_id: Option<Uuid>,
        freezer_id: Option<Uuid>,
    ) -> bool {
        [rack_id, shelf_id, freezer_id]
            .iter()
            .filter(|id| id.is_some())
            .count()
            > 1
    }

    /// Column values `(rack_id, shelf_id, freezer_id)` for this attachment
    pub fn columns(self) -> (Option<Uuid>, Option<Uuid>, Option<Uuid>) {
        match self {
            ParentRef::Unattached => (None, None, None),
            ParentRef::Rack(id) => (Some(id), None, None),
            ParentRef::Shelf(id) => (None, Some(id), None),
            ParentRef::Freezer(id) => (None, None, Some(id)),
        }
    }

    pub fn container(self) -> Option<ContainerRef> {
        match self {
            ParentRef::Unattached => None,
            ParentRef::Rack(id) => Some(ContainerRef::rack(id)),
            ParentRef::Shelf(id) => Some(ContainerRef::shelf(id)),
            ParentRef::Freezer(id) => Some(ContainerRef::freezer(id)),
        }
    }
}

/// Value a nullable parent column will hold once the active model is saved
pub(crate) fn settled(value: &ActiveValue<Option<Uuid>>) -> Option<Uuid> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => *v,
        ActiveValue::NotSet => None,
    }
}

/// Where a rack hangs: exactly one of shelf or freezer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RackParent {
    Shelf(Uuid),
    Freezer(Uuid),
}

impl RackParent {
    /// Shelf wins when a stored row carries both
    pub fn from_columns(shelf_id: Option<Uuid>, freezer_id: Option<Uuid>) -> Option<Self> {
        match (shelf_id, freezer_id) {
            (Some(shelf), _) => Some(RackParent::Shelf(shelf)),
            (None, Some(freezer)) => Some(RackParent::Freezer(freezer)),
            (None, None) => None,
        }
    }

    pub fn exclusive(shelf_id: Option<Uuid>, freezer_id: Option<Uuid>) -> BusinessResult<Self> {
        match (shelf_id, freezer_id) {
            (Some(shelf), None) => Ok(RackParent::Shelf(shelf)),
            (None, Some(freezer)) => Ok(RackParent::Freezer(freezer)),
            (Some(_), Some(_)) => Err(validation_error!(
                "parent",
                "a rack belongs to a shelf or directly to a freezer, not both"
            )),
            (None, None) => Err(validation_error!(
                "parent",
                "a rack must belong to a shelf or a freezer"
            )),
        }
    }

    pub fn columns(self) -> (Option<Uuid>, Option<Uuid>) {
        match self {
            RackParent::Shelf(id) => (Some(id), None),
            RackParent::Freezer(id) => (None, Some(id)),
        }
    }
}

/// Full ancestry of a container; levels a container skips are absent
#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct Containment {
    pub rack: Option<racks::models::Rack>,
    pub shelf: Option<shelves::models::Shelf>,
    pub freezer: Option<freezers::models::Freezer>,
    pub facility: Option<facilities::models::Facility>,
}

impl Containment {
    pub fn is_empty(&self) -> bool {
        self.rack.is_none()
            && self.shelf.is_none()
            && self.freezer.is_none()
            && self.facility.is_none()
    }
}

/// Common face of every level of the storage hierarchy
pub trait StorageContainer {
    const KIND: ContainerKind;

    fn id(&self) -> Uuid;

    fn display_name(&self) -> &str;

    fn reference(&self) -> ContainerRef {
        ContainerRef::new(Self::KIND, self.id())
    }
}

impl StorageContainer for facilities::models::Model {
    const KIND: ContainerKind = ContainerKind::Facility;

    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl StorageContainer for freezers::models::Model {
    const KIND: ContainerKind = ContainerKind::Freezer;

    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl StorageContainer for shelves::models::Model {
    const KIND: ContainerKind = ContainerKind::Shelf;

    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl StorageContainer for racks::models::Model {
    const KIND: ContainerKind = ContainerKind::Rack;

    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl StorageContainer for boxes::models::Model {
    const KIND: ContainerKind = ContainerKind::Box;

    fn id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Any loaded container, dispatched by kind
#[derive(Clone, Debug, PartialEq)]
pub enum Container {
    Facility(facilities::models::Model),
    Freezer(freezers::models::Model),
    Shelf(shelves::models::Model),
    Rack(racks::models::Model),
    Box(boxes::models::Model),
}

impl Container {
    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Facility(_) => ContainerKind::Facility,
            Container::Freezer(_) => ContainerKind::Freezer,
            Container::Shelf(_) => ContainerKind::Shelf,
            Container::Rack(_) => ContainerKind::Rack,
            Container::Box(_) => ContainerKind::Box,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Container::Facility(c) => c.id(),
            Container::Freezer(c) => c.id(),
            Container::Shelf(c) => c.id(),
            Container::Rack(c) => c.id(),
            Container::Box(c) => c.id(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Container::Facility(c) => c.display_name(),
            Container::Freezer(c) => c.display_name(),
            Container::Shelf(c) => c.display_name(),
            Container::Rack(c) => c.display_name(),
            Container::Box(c) => c.display_name(),
        }
    }

    pub fn reference(&self) -> ContainerRef {
        ContainerRef::new(self.kind(), self.id())
    }

    /// Capacity figures of this container. A box counts its own slots, every other kind
    /// the boxes beneath it.
    pub async fn capacity<C: ConnectionTrait>(&self, db: &C) -> BusinessResult<CapacitySummary> {
        match self {
            Container::Box(storage_box) => Ok(CapacitySummary::aggregate(
                &occupancy_of(db, std::slice::from_ref(storage_box)).await?,
            )),
            other => aggregate_scope(db, other.reference()).await,
        }
    }
}
