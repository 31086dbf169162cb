use super::models::{
    self as workflows, Choice, CommitReport, ConflictWarning, EntryFailure, RelocationState,
    RelocationStep, RelocationView, Selection,
};
use crate::common::errors::{BusinessError, BusinessResult};
use crate::containment::models::{ContainerRef, StorageContainer};
use crate::containment::services::{boxes_within, freezers_in};
use crate::positions::models::Slot;
use crate::positions::services::{assign, occupant};
use crate::{facilities, not_found, samples};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

fn decode(model: &workflows::Model) -> BusinessResult<RelocationState> {
    serde_json::from_str(&model.state).map_err(|err| BusinessError::InternalError {
        message: format!("relocation '{}' holds unreadable state: {err}", model.id),
    })
}

fn encode(state: &RelocationState) -> BusinessResult<String> {
    serde_json::to_string(state).map_err(|err| BusinessError::InternalError {
        message: err.to_string(),
    })
}

async fn find<C: ConnectionTrait>(db: &C, id: Uuid) -> BusinessResult<workflows::Model> {
    workflows::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found!("relocation", id))
}

/// Options for the step the workflow is waiting on
async fn choices_for<C: ConnectionTrait>(
    db: &C,
    state: &RelocationState,
    step: RelocationStep,
) -> BusinessResult<Vec<Choice>> {
    let choices = match step {
        RelocationStep::SelectFacility => facilities::models::Entity::find()
            .order_by_asc(facilities::models::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|facility| Choice {
                id: facility.id,
                name: facility.name,
            })
            .collect(),
        RelocationStep::SelectFreezer => match state.facility_id {
            Some(facility_id) => freezers_in(db, facility_id)
                .await?
                .into_iter()
                .map(|freezer| Choice {
                    id: freezer.id,
                    name: freezer.name,
                })
                .collect(),
            None => Vec::new(),
        },
        RelocationStep::SelectBox => match state.freezer_id {
            Some(freezer_id) => boxes_within(db, ContainerRef::freezer(freezer_id))
                .await?
                .into_iter()
                .map(|storage_box| Choice {
                    id: storage_box.id,
                    name: storage_box.display_name().to_string(),
                })
                .collect(),
            None => Vec::new(),
        },
        RelocationStep::AssignPositions | RelocationStep::Done => Vec::new(),
    };
    Ok(choices)
}

async fn view<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    state: RelocationState,
) -> BusinessResult<RelocationView> {
    let choices = choices_for(db, &state, state.step).await?;
    Ok(RelocationView { id, state, choices })
}

/// Open a workflow over a batch of samples, all of which must exist
pub async fn start(db: &DatabaseConnection, sample_ids: Vec<String>) -> BusinessResult<RelocationView> {
    let state = RelocationState::start(sample_ids)?;

    let known: HashSet<String> = samples::models::Entity::find()
        .filter(samples::models::Column::SampleId.is_in(state.sample_ids.iter().cloned()))
        .all(db)
        .await?
        .into_iter()
        .map(|sample| sample.sample_id)
        .collect();
    if let Some(missing) = state.sample_ids.iter().find(|id| !known.contains(*id)) {
        return Err(not_found!("sample", missing));
    }

    let now = chrono::Utc::now();
    let created = workflows::ActiveModel {
        id: Set(Uuid::new_v4()),
        state: Set(encode(&state)?),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await?;

    info!(relocation_id = %created.id, samples = state.sample_ids.len(), "Started relocation");
    view(db, created.id, state).await
}

pub async fn load(db: &DatabaseConnection, id: Uuid) -> BusinessResult<RelocationView> {
    let model = find(db, id).await?;
    let state = decode(&model)?;
    view(db, id, state).await
}

/// Answer a step. A rejected selection leaves the stored state untouched.
pub async fn advance(
    db: &DatabaseConnection,
    id: Uuid,
    selection: Selection,
) -> BusinessResult<RelocationView> {
    let model = find(db, id).await?;
    let state = decode(&model)?;

    let allowed: Vec<Uuid> = choices_for(db, &state, selection.step())
        .await?
        .into_iter()
        .map(|choice| choice.id)
        .collect();
    let next = state.advance(&selection, &allowed)?;

    let mut active: workflows::ActiveModel = model.into();
    active.state = Set(encode(&next)?);
    active.last_updated = Set(chrono::Utc::now());
    active.update(db).await?;

    info!(relocation_id = %id, step = ?next.step, "Advanced relocation");
    view(db, id, next).await
}

/// Entries whose target slot is already held, by another stored sample or by an
/// earlier entry of the same batch
pub async fn pending_conflicts(
    db: &DatabaseConnection,
    id: Uuid,
) -> BusinessResult<Vec<ConflictWarning>> {
    let state = decode(&find(db, id).await?)?;

    let mut claimed: HashMap<(Uuid, Slot), String> = HashMap::new();
    let mut warnings = Vec::new();
    for entry in &state.entries {
        let Some(Ok(slot)) = entry.slot() else {
            continue;
        };
        if let Some(first) = claimed.get(&(entry.box_id, slot)) {
            warnings.push(ConflictWarning {
                sample_id: entry.sample_id.clone(),
                slot: slot.label(),
                occupied_by: first.clone(),
            });
            continue;
        }
        claimed.insert((entry.box_id, slot), entry.sample_id.clone());

        if let Some(current) = occupant(db, entry.box_id, slot).await? {
            if current.sample_id != entry.sample_id {
                warnings.push(ConflictWarning {
                    sample_id: entry.sample_id.clone(),
                    slot: slot.label(),
                    occupied_by: current.sample_id,
                });
            }
        }
    }
    Ok(warnings)
}

/// Place every entry, one at a time and each on its own. Failures are reported per
/// sample and never undo placements already made. The workflow is discarded afterwards.
pub async fn commit(db: &DatabaseConnection, id: Uuid) -> BusinessResult<CommitReport> {
    let model = find(db, id).await?;
    let state = decode(&model)?;
    let (done, box_id) = state.complete()?;

    let mut report = CommitReport {
        box_id,
        placed: Vec::new(),
        conflicts: Vec::new(),
        invalid: Vec::new(),
    };
    for entry in &done.entries {
        let slot = match entry.slot() {
            Some(Ok(slot)) => slot,
            Some(Err(err)) => {
                report.invalid.push(failure(&entry.sample_id, None, &err, None));
                continue;
            }
            None => {
                report.invalid.push(EntryFailure {
                    sample_id: entry.sample_id.clone(),
                    slot: None,
                    reason: "no target position given".to_string(),
                    occupied_by: None,
                });
                continue;
            }
        };

        match assign(db, &entry.sample_id, entry.box_id, slot).await {
            Ok(position) => report.placed.push(position.into()),
            Err(err) => {
                if let BusinessError::PositionConflict { occupied_by, .. } = &err {
                    warn!(relocation_id = %id, sample_id = %entry.sample_id, slot = %slot, "Relocation entry conflicts");
                    let occupied_by = occupied_by.clone();
                    report
                        .conflicts
                        .push(failure(&entry.sample_id, Some(slot), &err, occupied_by));
                } else if matches!(
                    err,
                    BusinessError::ValidationError { .. } | BusinessError::NotFound { .. }
                ) {
                    warn!(relocation_id = %id, sample_id = %entry.sample_id, error = %err, "Relocation entry rejected");
                    report
                        .invalid
                        .push(failure(&entry.sample_id, Some(slot), &err, None));
                } else {
                    return Err(err);
                }
            }
        }
    }

    workflows::Entity::delete_by_id(id).exec(db).await?;
    info!(
        relocation_id = %id,
        box_id = %box_id,
        placed = report.placed.len(),
        conflicts = report.conflicts.len(),
        invalid = report.invalid.len(),
        "Committed relocation"
    );
    Ok(report)
}

fn failure(
    sample_id: &str,
    slot: Option<Slot>,
    err: &BusinessError,
    occupied_by: Option<String>,
) -> EntryFailure {
    EntryFailure {
        sample_id: sample_id.to_string(),
        slot: slot.map(Slot::label),
        reason: err.to_string(),
        occupied_by,
    }
}

/// Discard a workflow without placing anything
pub async fn cancel(db: &DatabaseConnection, id: Uuid) -> BusinessResult<()> {
    let result = workflows::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found!("relocation", id));
    }
    info!(relocation_id = %id, "Cancelled relocation");
    Ok(())
}
