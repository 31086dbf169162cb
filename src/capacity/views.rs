use super::models::{ContainerBreakdown, FacilityOverview};
use super::services;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::containment::models::{ContainerKind, ContainerRef};
use axum::{
    Json,
    extract::{Path, State},
};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_facility_overview))
        .routes(routes!(get_breakdown))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/facilities",
    responses(
        (status = 200, description = "Stored samples, boxes and free room per facility", body = Vec<FacilityOverview>)
    ),
    tag = "capacity",
    summary = "Facility overview"
)]
pub async fn get_facility_overview(
    State(state): State<AppState>,
) -> Result<Json<Vec<FacilityOverview>>, BusinessError> {
    Ok(Json(services::facility_overview(&state.db).await?))
}

/// Only boxes holding samples count towards capacity
#[utoipa::path(
    get,
    path = "/{kind}/{id}",
    params(
        ("kind" = ContainerKind, Path, description = "Container kind: facility, freezer, shelf, rack or box"),
        ("id" = Uuid, Path, description = "Container ID")
    ),
    responses(
        (status = 200, description = "Totals and non-empty children", body = ContainerBreakdown),
        (status = 404, description = "Container not found")
    ),
    tag = "capacity",
    summary = "Container fill level"
)]
pub async fn get_breakdown(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContainerKind, Uuid)>,
) -> Result<Json<ContainerBreakdown>, BusinessError> {
    Ok(Json(
        services::breakdown(&state.db, ContainerRef::new(kind, id)).await?,
    ))
}
