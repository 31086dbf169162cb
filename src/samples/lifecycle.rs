use crate::positions::services::evict;
use crate::sample_statuses;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use uuid::Uuid;

/// Statuses under which a sample keeps its box position
pub const STORED_STATUS_NAMES: [&str; 2] = ["In Storage", "Archived"];

pub fn is_stored_status(name: &str) -> bool {
    STORED_STATUS_NAMES.contains(&name)
}

/// A save evicts only when the sample has a status and it is not a stored one
pub fn requires_eviction(status_name: Option<&str>) -> bool {
    status_name.is_some_and(|name| !is_stored_status(name))
}

/// Run on every sample save, before the row is written. Returns whether a position was freed.
///
/// Restoring a stored status never brings a position back.
pub async fn on_save<C: ConnectionTrait>(
    db: &C,
    sample_id: &str,
    status_id: Option<Uuid>,
) -> Result<bool, DbErr> {
    let status_name = match status_id {
        Some(id) => Some(
            sample_statuses::models::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    DbErr::RecordNotFound(format!("Sample status with id '{id}' not found"))
                })?
                .name,
        ),
        None => None,
    };

    if requires_eviction(status_name.as_deref()) {
        evict(db, sample_id).await
    } else {
        Ok(false)
    }
}
