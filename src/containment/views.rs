use super::models::{ContainerKind, ContainerRef, Containment};
use super::services;
use crate::boxes::models::StorageBox;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_containment))
        .routes(routes!(get_boxes_within))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/{kind}/{id}",
    params(
        ("kind" = ContainerKind, Path, description = "Container kind: facility, freezer, shelf, rack or box"),
        ("id" = Uuid, Path, description = "Container ID")
    ),
    responses(
        (status = 200, description = "Ancestors of the container", body = Containment),
        (status = 404, description = "Container not found")
    ),
    tag = "containment",
    summary = "Resolve container ancestry"
)]
pub async fn get_containment(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContainerKind, Uuid)>,
) -> Result<Json<Containment>, BusinessError> {
    Ok(Json(services::resolve(&state.db, ContainerRef::new(kind, id)).await?))
}

#[utoipa::path(
    get,
    path = "/{kind}/{id}/boxes",
    params(
        ("kind" = ContainerKind, Path, description = "Container kind: facility, freezer, shelf, rack or box"),
        ("id" = Uuid, Path, description = "Container ID")
    ),
    responses(
        (status = 200, description = "Boxes transitively under the container", body = Vec<StorageBox>),
        (status = 404, description = "Container not found")
    ),
    tag = "containment",
    summary = "List boxes within a container"
)]
pub async fn get_boxes_within(
    State(state): State<AppState>,
    Path((kind, id)): Path<(ContainerKind, Uuid)>,
) -> Result<Json<Vec<StorageBox>>, BusinessError> {
    let boxes = services::boxes_within(&state.db, ContainerRef::new(kind, id)).await?;
    Ok(Json(boxes.into_iter().map(Into::into).collect()))
}
