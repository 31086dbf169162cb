use crate::containment::models::{ContainerKind, ContainerRef};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// One box's nominal slot count and how many samples it holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxOccupancy {
    pub box_id: Uuid,
    pub capacity: i32,
    pub stored: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct CapacitySummary {
    /// Summed capacity of the boxes holding at least one sample
    pub capacity: i64,
    pub stored: i64,
    pub boxes: usize,
    pub occupied_boxes: usize,
    pub percent_filled: f64,
}

impl CapacitySummary {
    /// Empty boxes count towards `boxes` but add nothing to `capacity`
    pub fn aggregate(occupancies: &[BoxOccupancy]) -> Self {
        let occupied: Vec<&BoxOccupancy> = occupancies.iter().filter(|b| b.stored > 0).collect();
        let capacity = occupied.iter().map(|b| i64::from(b.capacity)).sum();
        let stored = occupied.iter().map(|b| b.stored).sum();

        Self {
            capacity,
            stored,
            boxes: occupancies.len(),
            occupied_boxes: occupied.len(),
            percent_filled: percent_filled(stored, capacity),
        }
    }

    pub fn available(&self) -> i64 {
        self.capacity - self.stored
    }
}

/// `stored / capacity * 100`, or 0 when there is no capacity
#[allow(clippy::cast_precision_loss)]
pub fn percent_filled(stored: i64, capacity: i64) -> f64 {
    if capacity == 0 {
        0.0
    } else {
        stored as f64 / capacity as f64 * 100.0
    }
}

/// Fill level of one container
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ContainerSummary {
    pub kind: ContainerKind,
    pub id: Uuid,
    pub name: String,
    pub capacity: i64,
    pub stored: i64,
    pub percent_filled: f64,
}

/// A container's totals and its non-empty immediate children
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ContainerBreakdown {
    pub container: ContainerRef,
    pub name: String,
    pub totals: CapacitySummary,
    pub children: Vec<ContainerSummary>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct FacilityOverview {
    pub facility_id: Uuid,
    pub name: String,
    pub stored: i64,
    pub boxes: usize,
    pub capacity: i64,
    pub percent_filled: f64,
    pub available: i64,
}
