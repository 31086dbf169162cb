use super::models::{
    BoxOccupancy, CapacitySummary, ContainerBreakdown, ContainerSummary, FacilityOverview,
};
use crate::common::errors::BusinessResult;
use crate::containment::models::{Container, ContainerRef, ParentRef, RackParent};
use crate::containment::services::{boxes_within, freezers_in, load};
use crate::positions::services::{slot_count, stored_counts};
use crate::{boxes, facilities, racks, shelves};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;
use uuid::Uuid;

pub async fn occupancy_of<C: ConnectionTrait>(
    db: &C,
    boxes: &[boxes::models::Model],
) -> BusinessResult<Vec<BoxOccupancy>> {
    let ids: Vec<Uuid> = boxes.iter().map(|b| b.id).collect();
    let counts = stored_counts(db, &ids).await?;
    Ok(boxes
        .iter()
        .map(|b| BoxOccupancy {
            box_id: b.id,
            capacity: slot_count(b),
            stored: counts.get(&b.id).copied().unwrap_or(0),
        })
        .collect())
}

/// Capacity figures over every box under a container
pub async fn aggregate_scope<C: ConnectionTrait>(
    db: &C,
    scope: ContainerRef,
) -> BusinessResult<CapacitySummary> {
    let boxes = boxes_within(db, scope).await?;
    let summary = CapacitySummary::aggregate(&occupancy_of(db, &boxes).await?);
    debug!(
        kind = %scope.kind,
        id = %scope.id,
        boxes = summary.boxes,
        stored = summary.stored,
        "Aggregated capacity"
    );
    Ok(summary)
}

/// Immediate children of a container, in display order
async fn children<C: ConnectionTrait>(db: &C, parent: &Container) -> BusinessResult<Vec<Container>> {
    let mut found = Vec::new();
    match parent {
        Container::Facility(facility) => {
            found.extend(
                freezers_in(db, facility.id)
                    .await?
                    .into_iter()
                    .map(Container::Freezer),
            );
        }
        Container::Freezer(freezer) => {
            found.extend(
                attached_boxes(db, boxes::models::Column::FreezerId, freezer.id, |p| {
                    p == ParentRef::Freezer(freezer.id)
                })
                .await?,
            );
            found.extend(
                shelves::models::Entity::find()
                    .filter(shelves::models::Column::FreezerId.eq(freezer.id))
                    .order_by_asc(shelves::models::Column::Name)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(Container::Shelf),
            );
            found.extend(
                attached_racks(db, racks::models::Column::FreezerId, freezer.id, |p| {
                    p == Some(RackParent::Freezer(freezer.id))
                })
                .await?,
            );
        }
        Container::Shelf(shelf) => {
            found.extend(
                attached_boxes(db, boxes::models::Column::ShelfId, shelf.id, |p| {
                    p == ParentRef::Shelf(shelf.id)
                })
                .await?,
            );
            found.extend(
                attached_racks(db, racks::models::Column::ShelfId, shelf.id, |p| {
                    p == Some(RackParent::Shelf(shelf.id))
                })
                .await?,
            );
        }
        Container::Rack(rack) => {
            found.extend(
                attached_boxes(db, boxes::models::Column::RackId, rack.id, |p| {
                    p == ParentRef::Rack(rack.id)
                })
                .await?,
            );
        }
        Container::Box(_) => {}
    }
    Ok(found)
}

async fn attached_boxes<C: ConnectionTrait>(
    db: &C,
    column: boxes::models::Column,
    id: Uuid,
    keep: impl Fn(ParentRef) -> bool,
) -> BusinessResult<Vec<Container>> {
    Ok(boxes::models::Entity::find()
        .filter(column.eq(id))
        .order_by_asc(boxes::models::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .filter(|storage_box| keep(storage_box.parent()))
        .map(Container::Box)
        .collect())
}

async fn attached_racks<C: ConnectionTrait>(
    db: &C,
    column: racks::models::Column,
    id: Uuid,
    keep: impl Fn(Option<RackParent>) -> bool,
) -> BusinessResult<Vec<Container>> {
    Ok(racks::models::Entity::find()
        .filter(column.eq(id))
        .order_by_asc(racks::models::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .filter(|rack| keep(rack.parent()))
        .map(Container::Rack)
        .collect())
}

/// Totals of a container plus the fill level of each non-empty immediate child
pub async fn breakdown<C: ConnectionTrait>(
    db: &C,
    scope: ContainerRef,
) -> BusinessResult<ContainerBreakdown> {
    let container = load(db, scope).await?;
    let totals = container.capacity(db).await?;

    let mut summaries = Vec::new();
    for child in children(db, &container).await? {
        let child_totals = child.capacity(db).await?;
        if child_totals.stored == 0 {
            continue;
        }
        summaries.push(ContainerSummary {
            kind: child.kind(),
            id: child.id(),
            name: child.display_name().to_string(),
            capacity: child_totals.capacity,
            stored: child_totals.stored,
            percent_filled: child_totals.percent_filled,
        });
    }

    Ok(ContainerBreakdown {
        container: scope,
        name: container.display_name().to_string(),
        totals,
        children: summaries,
    })
}

/// Stored samples, boxes and remaining room per facility
pub async fn facility_overview<C: ConnectionTrait>(db: &C) -> BusinessResult<Vec<FacilityOverview>> {
    let facilities = facilities::models::Entity::find()
        .order_by_asc(facilities::models::Column::Name)
        .all(db)
        .await?;

    let mut overview = Vec::with_capacity(facilities.len());
    for facility in facilities {
        let summary = aggregate_scope(db, ContainerRef::facility(facility.id)).await?;
        overview.push(FacilityOverview {
            facility_id: facility.id,
            available: summary.available(),
            name: facility.name,
            stored: summary.stored,
            boxes: summary.boxes,
            capacity: summary.capacity,
            percent_filled: summary.percent_filled,
        });
    }
    Ok(overview)
}
