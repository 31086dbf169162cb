use super::models::{self as positions, BoxOccupancyView, FALLBACK_BOX_CAPACITY, Slot, SlotView};
use crate::common::errors::{BusinessError, BusinessResult};
use crate::{boxes, not_found, samples, validation_error};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

/// Number of addressable slots in a box
pub fn slot_count(storage_box: &boxes::models::Model) -> i32 {
    storage_box.capacity.unwrap_or(FALLBACK_BOX_CAPACITY).max(0)
}

/// Every slot of a box in running order, `1..=slot_count`
pub fn all_slots(slot_count: i32) -> impl Iterator<Item = Slot> {
    (1..=slot_count).map(Slot::from_number)
}

pub fn check_slot(storage_box: &boxes::models::Model, slot: Slot) -> BusinessResult<()> {
    let count = slot_count(storage_box);
    if slot.is_within(count) {
        Ok(())
    } else {
        Err(validation_error!(
            "position",
            format!(
                "{} is outside box '{}' which has {count} slots",
                slot.label(),
                storage_box.name
            )
        ))
    }
}

pub async fn find_box<C: ConnectionTrait>(
    db: &C,
    box_id: Uuid,
) -> BusinessResult<boxes::models::Model> {
    boxes::models::Entity::find_by_id(box_id)
        .one(db)
        .await?
        .ok_or_else(|| not_found!("box", box_id))
}

pub async fn occupied_positions<C: ConnectionTrait>(
    db: &C,
    box_id: Uuid,
) -> Result<Vec<positions::Model>, DbErr> {
    positions::Entity::find()
        .filter(positions::Column::BoxId.eq(box_id))
        .order_by_asc(positions::Column::YPosition)
        .order_by_asc(positions::Column::XPosition)
        .all(db)
        .await
}

/// Free slots of a box in running order, recomputed from the position store on each call
pub async fn free_positions<C: ConnectionTrait>(db: &C, box_id: Uuid) -> BusinessResult<Vec<Slot>> {
    let storage_box = find_box(db, box_id).await?;
    let occupied: HashSet<Slot> = occupied_positions(db, box_id)
        .await?
        .iter()
        .map(positions::Model::slot)
        .collect();

    Ok(all_slots(slot_count(&storage_box))
        .filter(|slot| !occupied.contains(slot))
        .collect())
}

pub async fn occupancy<C: ConnectionTrait>(db: &C, box_id: Uuid) -> BusinessResult<BoxOccupancyView> {
    let storage_box = find_box(db, box_id).await?;
    let occupied = occupied_positions(db, box_id).await?;
    let taken: HashSet<Slot> = occupied.iter().map(positions::Model::slot).collect();
    let count = slot_count(&storage_box);

    Ok(BoxOccupancyView {
        box_id,
        slot_count: count,
        free: all_slots(count)
            .filter(|slot| !taken.contains(slot))
            .map(SlotView::free)
            .collect(),
        occupied: occupied.into_iter().map(SlotView::from).collect(),
    })
}

pub async fn occupant<C: ConnectionTrait>(
    db: &C,
    box_id: Uuid,
    slot: Slot,
) -> Result<Option<positions::Model>, DbErr> {
    positions::Entity::find()
        .filter(positions::Column::BoxId.eq(box_id))
        .filter(positions::Column::XPosition.eq(slot.x))
        .filter(positions::Column::YPosition.eq(slot.y))
        .one(db)
        .await
}

pub async fn is_occupied<C: ConnectionTrait>(db: &C, box_id: Uuid, slot: Slot) -> Result<bool, DbErr> {
    Ok(occupant(db, box_id, slot).await?.is_some())
}

pub async fn position_of<C: ConnectionTrait>(
    db: &C,
    sample_id: &str,
) -> Result<Option<positions::Model>, DbErr> {
    positions::Entity::find()
        .filter(positions::Column::SampleId.eq(sample_id))
        .one(db)
        .await
}

/// Stored sample count per box, for the given boxes only. Boxes without samples are absent.
pub async fn stored_counts<C: ConnectionTrait>(
    db: &C,
    box_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, DbErr> {
    if box_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = positions::Entity::find()
        .select_only()
        .column(positions::Column::BoxId)
        .column_as(Expr::col(positions::Column::Id).count(), "stored")
        .filter(positions::Column::BoxId.is_in(box_ids.to_vec()))
        .group_by(positions::Column::BoxId)
        .into_tuple()
        .all(db)
        .await?;
    debug!(boxes = box_ids.len(), non_empty = rows.len(), "Counted stored samples");
    Ok(rows.into_iter().collect())
}

/// Place `sample_id` at `slot` of `box_id`, moving it if it is already placed elsewhere.
///
/// The occupancy check and the write share one transaction, and the unique index on
/// `(box_id, x_position, y_position)` backs it up against concurrent writers.
pub async fn assign<C: TransactionTrait>(
    db: &C,
    sample_id: &str,
    box_id: Uuid,
    slot: Slot,
) -> BusinessResult<positions::Model> {
    let txn = db.begin().await?;

    samples::models::Entity::find()
        .filter(samples::models::Column::SampleId.eq(sample_id))
        .one(&txn)
        .await?
        .ok_or_else(|| not_found!("sample", sample_id))?;
    let storage_box = find_box(&txn, box_id).await?;
    check_slot(&storage_box, slot)?;

    if let Some(current) = occupant(&txn, box_id, slot).await? {
        if current.sample_id == sample_id {
            txn.commit().await?;
            return Ok(current);
        }
        return Err(BusinessError::PositionConflict {
            sample_id: sample_id.to_string(),
            box_id,
            slot: slot.label(),
            occupied_by: Some(current.sample_id),
        });
    }

    let previous = position_of(&txn, sample_id).await?;
    let written = write_position(&txn, sample_id, box_id, slot, previous).await?;
    txn.commit()
        .await
        .map_err(|err| write_error(err, sample_id, box_id, slot))?;

    Ok(written)
}

/// Write step of `assign`, taking `previous` as the sample's current position.
///
/// When another writer took the slot, or placed the same sample, after those reads were
/// made, the unique indexes reject the write and it surfaces as a `PositionConflict`.
pub(crate) async fn write_position<C: ConnectionTrait>(
    db: &C,
    sample_id: &str,
    box_id: Uuid,
    slot: Slot,
    previous: Option<positions::Model>,
) -> BusinessResult<positions::Model> {
    let now = chrono::Utc::now();
    match previous {
        Some(previous) => {
            let from = (previous.box_id, previous.slot());
            let mut active: positions::ActiveModel = previous.into();
            active.box_id = Set(box_id);
            active.x_position = Set(slot.x);
            active.y_position = Set(slot.y);
            active.last_updated = Set(now);
            let moved = active
                .update(db)
                .await
                .map_err(|err| write_error(err, sample_id, box_id, slot))?;
            info!(
                sample_id,
                from_box = %from.0,
                from_slot = %from.1,
                to_box = %box_id,
                to_slot = %slot,
                "Moved sample"
            );
            Ok(moved)
        }
        None => {
            let placed = positions::ActiveModel {
                id: Set(Uuid::new_v4()),
                sample_id: Set(sample_id.to_string()),
                box_id: Set(box_id),
                x_position: Set(slot.x),
                y_position: Set(slot.y),
                created_at: Set(now),
                last_updated: Set(now),
            }
            .insert(db)
            .await
            .map_err(|err| write_error(err, sample_id, box_id, slot))?;
            info!(sample_id, box_id = %box_id, slot = %slot, "Placed sample");
            Ok(placed)
        }
    }
}

fn write_error(err: DbErr, sample_id: &str, box_id: Uuid, slot: Slot) -> BusinessError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => BusinessError::PositionConflict {
            sample_id: sample_id.to_string(),
            box_id,
            slot: slot.label(),
            occupied_by: None,
        },
        _ => BusinessError::from(err),
    }
}

/// Remove a sample's position. Returns whether there was one.
pub async fn evict<C: ConnectionTrait>(db: &C, sample_id: &str) -> Result<bool, DbErr> {
    let result = positions::Entity::delete_many()
        .filter(positions::Column::SampleId.eq(sample_id))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        info!(sample_id, "Evicted sample from its position");
    }
    Ok(result.rows_affected > 0)
}
