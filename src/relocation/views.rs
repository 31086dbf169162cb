use super::models::{CommitReport, ConflictWarning, RelocationStart, RelocationView, Selection};
use super::services;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(start_relocation))
        .routes(routes!(get_relocation, cancel_relocation))
        .routes(routes!(advance_relocation))
        .routes(routes!(get_conflicts))
        .routes(routes!(commit_relocation))
        .with_state(state.clone())
}

#[utoipa::path(
    post,
    path = "/",
    request_body = RelocationStart,
    responses(
        (status = 201, description = "Relocation opened at facility selection", body = RelocationView),
        (status = 400, description = "Empty batch"),
        (status = 404, description = "A sample does not exist")
    ),
    tag = "relocations",
    summary = "Start relocation"
)]
pub async fn start_relocation(
    State(state): State<AppState>,
    Json(input): Json<RelocationStart>,
) -> Result<(StatusCode, Json<RelocationView>), BusinessError> {
    let view = services::start(&state.db, input.sample_ids).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Relocation ID")),
    responses(
        (status = 200, description = "Current step, selections and offered choices", body = RelocationView),
        (status = 404, description = "Relocation not found")
    ),
    tag = "relocations",
    summary = "Get relocation"
)]
pub async fn get_relocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RelocationView>, BusinessError> {
    Ok(Json(services::load(&state.db, id).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Relocation ID")),
    responses(
        (status = 204, description = "Relocation discarded"),
        (status = 404, description = "Relocation not found")
    ),
    tag = "relocations",
    summary = "Cancel relocation"
)]
pub async fn cancel_relocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BusinessError> {
    services::cancel(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/steps",
    params(("id" = Uuid, Path, description = "Relocation ID")),
    request_body = Selection,
    responses(
        (status = 200, description = "Selection accepted", body = RelocationView),
        (status = 400, description = "Selection out of order or not among the choices"),
        (status = 404, description = "Relocation not found")
    ),
    tag = "relocations",
    summary = "Answer a relocation step"
)]
pub async fn advance_relocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(selection): Json<Selection>,
) -> Result<Json<RelocationView>, BusinessError> {
    Ok(Json(services::advance(&state.db, id, selection).await?))
}

#[utoipa::path(
    get,
    path = "/{id}/conflicts",
    params(("id" = Uuid, Path, description = "Relocation ID")),
    responses(
        (status = 200, description = "Entries aimed at occupied slots", body = Vec<ConflictWarning>),
        (status = 404, description = "Relocation not found")
    ),
    tag = "relocations",
    summary = "Check relocation conflicts"
)]
pub async fn get_conflicts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ConflictWarning>>, BusinessError> {
    Ok(Json(services::pending_conflicts(&state.db, id).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/commit",
    params(("id" = Uuid, Path, description = "Relocation ID")),
    responses(
        (status = 200, description = "Per-sample outcome; successful placements stand", body = CommitReport),
        (status = 400, description = "No box selected yet"),
        (status = 404, description = "Relocation not found")
    ),
    tag = "relocations",
    summary = "Commit relocation"
)]
pub async fn commit_relocation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CommitReport>, BusinessError> {
    Ok(Json(services::commit(&state.db, id).await?))
}
