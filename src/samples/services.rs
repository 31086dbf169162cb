use super::lifecycle;
use super::models::{self as samples, InventorySummary, SampleLocation, StatusChangeReport};
use crate::common::errors::BusinessResult;
use crate::containment::models::{ContainerRef, Containment, settled};
use crate::containment::services::resolve;
use crate::positions::services::{find_box, position_of};
use crate::{not_found, sample_statuses, sample_types};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

pub async fn find_by_sample_id<C: ConnectionTrait>(
    db: &C,
    sample_id: &str,
) -> BusinessResult<samples::Model> {
    samples::Entity::find()
        .filter(samples::Column::SampleId.eq(sample_id))
        .one(db)
        .await?
        .ok_or_else(|| not_found!("sample", sample_id))
}

/// Persist changes to a sample, running the status lifecycle in the same transaction.
///
/// Returns the saved row and whether the sample lost its position.
pub async fn save_sample<C: TransactionTrait>(
    db: &C,
    existing: &samples::Model,
    changes: samples::ActiveModel,
) -> Result<(samples::Model, bool), DbErr> {
    let txn = db.begin().await?;
    let evicted =
        lifecycle::on_save(&txn, &existing.sample_id, settled(&changes.sample_status_id)).await?;
    let saved = changes.update(&txn).await?;
    txn.commit().await?;
    Ok((saved, evicted))
}

/// Change the status of one sample. Leaving the stored states frees its position.
pub async fn set_status<C: TransactionTrait + ConnectionTrait>(
    db: &C,
    sample_id: &str,
    status_id: Option<Uuid>,
) -> BusinessResult<(samples::Model, bool)> {
    if let Some(id) = status_id {
        sample_statuses::models::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| not_found!("sample status", id))?;
    }
    let existing = find_by_sample_id(db, sample_id).await?;

    let mut changes: samples::ActiveModel = existing.clone().into();
    changes.sample_status_id = Set(status_id);
    changes.last_updated = Set(chrono::Utc::now());
    let (saved, evicted) = save_sample(db, &existing, changes).await?;

    info!(sample_id, status_id = ?status_id, evicted, "Changed sample status");
    Ok((saved, evicted))
}

/// Change the status of many samples. Unknown sample ids are reported, not fatal.
pub async fn set_status_many<C: TransactionTrait + ConnectionTrait>(
    db: &C,
    sample_ids: &[String],
    status_id: Option<Uuid>,
) -> BusinessResult<StatusChangeReport> {
    let mut report = StatusChangeReport::default();
    for sample_id in sample_ids {
        if report.updated.contains(sample_id) || report.not_found.contains(sample_id) {
            continue;
        }
        match set_status(db, sample_id, status_id).await {
            Ok((_, evicted)) => {
                report.updated.push(sample_id.clone());
                if evicted {
                    report.evicted.push(sample_id.clone());
                }
            }
            Err(crate::common::errors::BusinessError::NotFound { resource, .. })
                if resource == "sample" =>
            {
                report.not_found.push(sample_id.clone());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

/// Sample with its position, box and the box's ancestry
pub async fn locate<C: ConnectionTrait>(db: &C, sample_id: &str) -> BusinessResult<SampleLocation> {
    let sample = find_by_sample_id(db, sample_id).await?;
    let status = match sample.sample_status_id {
        Some(id) => sample_statuses::models::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|status| status.name),
        None => None,
    };

    let (position, storage_box, containment) = match position_of(db, sample_id).await? {
        Some(position) => {
            let storage_box = find_box(db, position.box_id).await?;
            let containment = resolve(db, ContainerRef::storage_box(storage_box.id)).await?;
            (Some(position.into()), Some(storage_box.into()), containment)
        }
        None => (None, None, Containment::default()),
    };

    Ok(SampleLocation {
        sample: sample.into(),
        status,
        position,
        storage_box,
        containment,
    })
}

pub async fn summary<C: ConnectionTrait>(db: &C) -> BusinessResult<InventorySummary> {
    let total_samples = samples::Entity::find().count(db).await?;
    let sample_types = sample_types::models::Entity::find().count(db).await?;
    let participants = count_distinct(db, samples::Column::ParticipantId).await?;
    let studies = count_distinct(db, samples::Column::ProtocolNumber).await?;

    Ok(InventorySummary {
        total_samples,
        sample_types,
        participants,
        studies,
    })
}

/// `COUNT(DISTINCT column)` over all samples; NULLs are not counted
async fn count_distinct<C: ConnectionTrait>(
    db: &C,
    column: samples::Column,
) -> Result<u64, DbErr> {
    let count: Option<i64> = samples::Entity::find()
        .select_only()
        .column_as(Expr::col(column).count_distinct(), "count")
        .into_tuple()
        .one(db)
        .await?;
    Ok(count.and_then(|n| u64::try_from(n).ok()).unwrap_or(0))
}
