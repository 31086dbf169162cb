use super::models::{Container, ContainerKind, ContainerRef, Containment, ParentRef, RackParent};
use crate::common::errors::BusinessResult;
use crate::{boxes, facilities, freezers, not_found, racks, shelves};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

/// Load any container by kind and id
pub async fn load<C: ConnectionTrait>(db: &C, target: ContainerRef) -> BusinessResult<Container> {
    let id = target.id;
    let found = match target.kind {
        ContainerKind::Facility => facilities::models::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Container::Facility),
        ContainerKind::Freezer => freezers::models::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Container::Freezer),
        ContainerKind::Shelf => shelves::models::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Container::Shelf),
        ContainerKind::Rack => racks::models::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Container::Rack),
        ContainerKind::Box => boxes::models::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Container::Box),
    };
    found.ok_or_else(|| not_found!(target.kind, id))
}

/// Ancestry of a container, the container itself excluded.
///
/// Levels a container skips are absent. An unattached box resolves to an empty chain,
/// as does a facility. Only the requested container has to exist; dangling ancestors
/// end the walk.
pub async fn resolve<C: ConnectionTrait>(db: &C, target: ContainerRef) -> BusinessResult<Containment> {
    let mut chain = Containment::default();
    match load(db, target).await? {
        Container::Box(storage_box) => {
            if storage_box.has_ambiguous_parent() {
                warn!(
                    box_id = %storage_box.id,
                    resolved = ?storage_box.parent(),
                    "Box carries several parents, resolving rack > shelf > freezer"
                );
            }
            match storage_box.parent() {
                ParentRef::Rack(id) => {
                    if let Some(rack) = racks::models::Entity::find_by_id(id).one(db).await? {
                        walk_from_rack(db, rack, &mut chain).await?;
                    }
                }
                ParentRef::Shelf(id) => {
                    if let Some(shelf) = shelves::models::Entity::find_by_id(id).one(db).await? {
                        walk_from_shelf(db, shelf, &mut chain).await?;
                    }
                }
                ParentRef::Freezer(id) => {
                    if let Some(freezer) = freezers::models::Entity::find_by_id(id).one(db).await? {
                        walk_from_freezer(db, freezer, &mut chain).await?;
                    }
                }
                ParentRef::Unattached => {}
            }
        }
        Container::Rack(rack) => {
            walk_from_rack(db, rack, &mut chain).await?;
            chain.rack = None;
        }
        Container::Shelf(shelf) => {
            walk_from_shelf(db, shelf, &mut chain).await?;
            chain.shelf = None;
        }
        Container::Freezer(freezer) => {
            walk_from_freezer(db, freezer, &mut chain).await?;
            chain.freezer = None;
        }
        Container::Facility(_) => {}
    }
    Ok(chain)
}

async fn walk_from_rack<C: ConnectionTrait>(
    db: &C,
    rack: racks::models::Model,
    chain: &mut Containment,
) -> BusinessResult<()> {
    if rack.shelf_id.is_some() && rack.freezer_id.is_some() {
        warn!(rack_id = %rack.id, "Rack carries both a shelf and a freezer, resolving via the shelf");
    }
    match rack.parent() {
        Some(RackParent::Shelf(id)) => {
            if let Some(shelf) = shelves::models::Entity::find_by_id(id).one(db).await? {
                walk_from_shelf(db, shelf, chain).await?;
            }
        }
        Some(RackParent::Freezer(id)) => {
            if let Some(freezer) = freezers::models::Entity::find_by_id(id).one(db).await? {
                walk_from_freezer(db, freezer, chain).await?;
            }
        }
        None => {}
    }
    chain.rack = Some(rack.into());
    Ok(())
}

async fn walk_from_shelf<C: ConnectionTrait>(
    db: &C,
    shelf: shelves::models::Model,
    chain: &mut Containment,
) -> BusinessResult<()> {
    if let Some(freezer) = freezers::models::Entity::find_by_id(shelf.freezer_id)
        .one(db)
        .await?
    {
        walk_from_freezer(db, freezer, chain).await?;
    }
    chain.shelf = Some(shelf.into());
    Ok(())
}

async fn walk_from_freezer<C: ConnectionTrait>(
    db: &C,
    freezer: freezers::models::Model,
    chain: &mut Containment,
) -> BusinessResult<()> {
    chain.facility = facilities::models::Entity::find_by_id(freezer.facility_id)
        .one(db)
        .await?
        .map(Into::into);
    chain.freezer = Some(freezer.into());
    Ok(())
}

/// Every box transitively under a container.
///
/// Boxes hang from racks, shelves or freezers directly, so the search unions all three
/// attachment paths at every level below the scope.
pub async fn boxes_within<C: ConnectionTrait>(
    db: &C,
    scope: ContainerRef,
) -> BusinessResult<Vec<boxes::models::Model>> {
    let (freezer_ids, shelf_ids, rack_ids) = match load(db, scope).await? {
        Container::Box(storage_box) => return Ok(vec![storage_box]),
        Container::Rack(rack) => (HashSet::new(), HashSet::new(), HashSet::from([rack.id])),
        Container::Shelf(shelf) => (HashSet::new(), HashSet::from([shelf.id]), HashSet::new()),
        Container::Freezer(freezer) => {
            (HashSet::from([freezer.id]), HashSet::new(), HashSet::new())
        }
        Container::Facility(facility) => {
            let freezer_ids = freezers::models::Entity::find()
                .filter(freezers::models::Column::FacilityId.eq(facility.id))
                .all(db)
                .await?
                .into_iter()
                .map(|freezer| freezer.id)
                .collect();
            (freezer_ids, HashSet::new(), HashSet::new())
        }
    };
    boxes_under(db, freezer_ids, shelf_ids, rack_ids).await
}

async fn boxes_under<C: ConnectionTrait>(
    db: &C,
    freezer_ids: HashSet<Uuid>,
    mut shelf_ids: HashSet<Uuid>,
    mut rack_ids: HashSet<Uuid>,
) -> BusinessResult<Vec<boxes::models::Model>> {
    if !freezer_ids.is_empty() {
        shelf_ids.extend(
            shelves::models::Entity::find()
                .filter(shelves::models::Column::FreezerId.is_in(freezer_ids.iter().copied()))
                .all(db)
                .await?
                .into_iter()
                .map(|shelf| shelf.id),
        );
    }

    let rack_condition = any_of([
        (racks::models::Column::FreezerId, &freezer_ids),
        (racks::models::Column::ShelfId, &shelf_ids),
    ]);
    if !rack_condition.is_empty() {
        rack_ids.extend(
            racks::models::Entity::find()
                .filter(rack_condition)
                .all(db)
                .await?
                .into_iter()
                .filter(|rack| match rack.parent() {
                    Some(RackParent::Shelf(id)) => shelf_ids.contains(&id),
                    Some(RackParent::Freezer(id)) => freezer_ids.contains(&id),
                    None => false,
                })
                .map(|rack| rack.id),
        );
    }

    let box_condition = any_of([
        (boxes::models::Column::FreezerId, &freezer_ids),
        (boxes::models::Column::ShelfId, &shelf_ids),
        (boxes::models::Column::RackId, &rack_ids),
    ]);
    if box_condition.is_empty() {
        return Ok(Vec::new());
    }

    Ok(boxes::models::Entity::find()
        .filter(box_condition)
        .order_by_asc(boxes::models::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .filter(|storage_box| match storage_box.parent() {
            ParentRef::Rack(id) => rack_ids.contains(&id),
            ParentRef::Shelf(id) => shelf_ids.contains(&id),
            ParentRef::Freezer(id) => freezer_ids.contains(&id),
            ParentRef::Unattached => false,
        })
        .collect())
}

/// OR of `column IN ids` over the non-empty id sets
fn any_of<Col: ColumnTrait, const N: usize>(paths: [(Col, &HashSet<Uuid>); N]) -> Condition {
    paths
        .into_iter()
        .filter(|(_, ids)| !ids.is_empty())
        .fold(Condition::any(), |condition, (column, ids)| {
            condition.add(column.is_in(ids.iter().copied()))
        })
}

/// Freezers of a facility, by name
pub async fn freezers_in<C: ConnectionTrait>(
    db: &C,
    facility_id: Uuid,
) -> BusinessResult<Vec<freezers::models::Model>> {
    Ok(freezers::models::Entity::find()
        .filter(freezers::models::Column::FacilityId.eq(facility_id))
        .order_by_asc(freezers::models::Column::Name)
        .all(db)
        .await?)
}

/// Re-attach a box. Its positions stay with it.
pub async fn attach_box<C: ConnectionTrait>(
    db: &C,
    box_id: Uuid,
    parent: ParentRef,
) -> BusinessResult<boxes::models::Model> {
    let storage_box = boxes::models::Entity::find_by_id(box_id)
        .one(db)
        .await?
        .ok_or_else(|| not_found!("box", box_id))?;
    if let Some(target) = parent.container() {
        load(db, target).await?;
    }

    let previous = storage_box.parent();
    let (rack_id, shelf_id, freezer_id) = parent.columns();
    let mut active = storage_box.into_active_model();
    active.rack_id = Set(rack_id);
    active.shelf_id = Set(shelf_id);
    active.freezer_id = Set(freezer_id);
    active.last_updated = Set(chrono::Utc::now());
    let moved = active.update(db).await?;

    info!(box_id = %box_id, from = ?previous, to = ?parent, "Moved box");
    Ok(moved)
}
