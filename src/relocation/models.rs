use crate::common::errors::BusinessResult;
use crate::positions::models::{PlacedPosition, Slot};
use crate::validation_error;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

/// Persisted workflow; `state` holds a serialized `RelocationState`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "relocation_workflows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RelocationStep {
    SelectFacility,
    SelectFreezer,
    SelectBox,
    AssignPositions,
    Done,
}

/// Target of one sample in the batch. Column is 1-based, row a letter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PositionEntry {
    pub sample_id: String,
    pub box_id: Uuid,
    pub column: Option<i32>,
    pub row: Option<String>,
}

impl PositionEntry {
    /// Stored slot for this entry, once both column and row are filled in
    pub fn slot(&self) -> Option<BusinessResult<Slot>> {
        match (self.column, self.row.as_deref()) {
            (Some(column), Some(row)) => Some(Slot::from_external(column, row)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, ToSchema)]
pub struct PositionEntryInput {
    pub sample_id: String,
    pub column: i32,
    pub row: String,
}

/// Input for one step of the workflow
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Selection {
    Facility { facility_id: Uuid },
    Freezer { freezer_id: Uuid },
    Box { box_id: Uuid },
    Positions { entries: Vec<PositionEntryInput> },
}

impl Selection {
    /// The step this selection answers
    pub fn step(&self) -> RelocationStep {
        match self {
            Selection::Facility { .. } => RelocationStep::SelectFacility,
            Selection::Freezer { .. } => RelocationStep::SelectFreezer,
            Selection::Box { .. } => RelocationStep::SelectBox,
            Selection::Positions { .. } => RelocationStep::AssignPositions,
        }
    }
}

/// Everything the workflow carries between steps
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RelocationState {
    pub sample_ids: Vec<String>,
    pub step: RelocationStep,
    pub facility_id: Option<Uuid>,
    pub freezer_id: Option<Uuid>,
    pub box_id: Option<Uuid>,
    pub entries: Vec<PositionEntry>,
}

impl RelocationState {
    /// New workflow over a batch; duplicate ids collapse, order is kept
    pub fn start(sample_ids: Vec<String>) -> BusinessResult<Self> {
        let mut seen = HashSet::new();
        let sample_ids: Vec<String> = sample_ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();
        if sample_ids.is_empty() {
            return Err(validation_error!(
                "sample_ids",
                "a relocation needs at least one sample"
            ));
        }

        Ok(Self {
            sample_ids,
            step: RelocationStep::SelectFacility,
            facility_id: None,
            freezer_id: None,
            box_id: None,
            entries: Vec::new(),
        })
    }

    /// Apply a selection, returning the next state. `choices` is the allowed id set of the
    /// step being answered; it is ignored for position entries.
    ///
    /// Answering an earlier step again rewinds the workflow and drops every later choice.
    /// On error the current state is left as it was.
    pub fn advance(&self, selection: &Selection, choices: &[Uuid]) -> BusinessResult<Self> {
        if self.step == RelocationStep::Done {
            return Err(validation_error!("step", "the relocation is already committed"));
        }
        if selection.step() > self.step {
            return Err(validation_error!(
                "step",
                format!(
                    "cannot answer {:?} before {:?}",
                    selection.step(),
                    self.step
                )
            ));
        }

        let mut next = self.clone();
        match selection {
            Selection::Facility { facility_id } => {
                require_choice("facility_id", *facility_id, choices)?;
                next.facility_id = Some(*facility_id);
                next.freezer_id = None;
                next.box_id = None;
                next.entries.clear();
                next.step = RelocationStep::SelectFreezer;
            }
            Selection::Freezer { freezer_id } => {
                require_choice("freezer_id", *freezer_id, choices)?;
                next.freezer_id = Some(*freezer_id);
                next.box_id = None;
                next.entries.clear();
                next.step = RelocationStep::SelectBox;
            }
            Selection::Box { box_id } => {
                require_choice("box_id", *box_id, choices)?;
                next.box_id = Some(*box_id);
                next.entries = self
                    .sample_ids
                    .iter()
                    .map(|sample_id| PositionEntry {
                        sample_id: sample_id.clone(),
                        box_id: *box_id,
                        column: None,
                        row: None,
                    })
                    .collect();
                next.step = RelocationStep::AssignPositions;
            }
            Selection::Positions { entries } => {
                for input in entries {
                    Slot::from_external(input.column, &input.row)?;
                    let entry = next
                        .entries
                        .iter_mut()
                        .find(|entry| entry.sample_id == input.sample_id)
                        .ok_or_else(|| {
                            validation_error!(
                                "sample_id",
                                format!("'{}' is not part of this relocation", input.sample_id)
                            )
                        })?;
                    entry.column = Some(input.column);
                    entry.row = Some(input.row.trim().to_uppercase());
                }
            }
        }
        Ok(next)
    }

    /// Terminal transition, open once a box is chosen. Yields the finished state and its box.
    pub fn complete(&self) -> BusinessResult<(Self, Uuid)> {
        match (self.step, self.box_id) {
            (RelocationStep::AssignPositions, Some(box_id)) => {
                let mut done = self.clone();
                done.step = RelocationStep::Done;
                Ok((done, box_id))
            }
            (RelocationStep::Done, _) => Err(validation_error!(
                "step",
                "the relocation is already committed"
            )),
            _ => Err(validation_error!(
                "step",
                "positions can only be committed once a box is selected"
            )),
        }
    }
}

fn require_choice(field: &str, id: Uuid, choices: &[Uuid]) -> BusinessResult<()> {
    if choices.contains(&id) {
        Ok(())
    } else {
        Err(validation_error!(
            field,
            format!("'{id}' is not one of the offered choices")
        ))
    }
}

/// Option offered at the current step
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Choice {
    pub id: Uuid,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct RelocationView {
    pub id: Uuid,
    pub state: RelocationState,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct RelocationStart {
    pub sample_ids: Vec<String>,
}

/// Pre-commit warning: the entry's target slot is already taken
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConflictWarning {
    pub sample_id: String,
    pub slot: String,
    pub occupied_by: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct EntryFailure {
    pub sample_id: String,
    pub slot: Option<String>,
    pub reason: String,
    pub occupied_by: Option<String>,
}

/// Outcome of committing a batch; placements are kept even when other entries fail
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CommitReport {
    pub box_id: Uuid,
    pub placed: Vec<PlacedPosition>,
    pub conflicts: Vec<EntryFailure>,
    pub invalid: Vec<EntryFailure>,
}
