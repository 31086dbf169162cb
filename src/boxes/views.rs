use super::models::{StorageBox, router as crudrouter};
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::containment::{models::ParentRef, services::attach_box};
use crate::positions::models::{BoxOccupancyView, SlotView};
use crate::positions::services;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{get, put};
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    crudrouter(&state.db.clone())
        .route("/{id}/parent", put(move_box).with_state(state.clone()))
        .route(
            "/{id}/positions",
            get(get_box_positions).with_state(state.clone()),
        )
        .route(
            "/{id}/free_positions",
            get(get_free_positions).with_state(state.clone()),
        )
}

/// Re-attach a box to a rack, a shelf, a freezer, or nothing
#[utoipa::path(
    put,
    path = "/boxes/{id}/parent",
    params(
        ("id" = Uuid, Path, description = "Box ID")
    ),
    request_body(
        content = Object,
        description = r#"Tagged parent, e.g. {"kind": "rack", "id": "..."} or {"kind": "unattached"}"#
    ),
    responses(
        (status = 200, description = "Box moved; its samples travel with it", body = StorageBox),
        (status = 400, description = "Malformed parent"),
        (status = 404, description = "Box or target container not found")
    ),
    tag = "boxes",
    summary = "Move box"
)]
pub async fn move_box(
    Path(box_id): Path<Uuid>,
    State(app_state): State<AppState>,
    Json(parent): Json<ParentRef>,
) -> Result<Json<StorageBox>, BusinessError> {
    let moved = attach_box(&app_state.db, box_id, parent).await?;
    Ok(Json(moved.into()))
}

#[utoipa::path(
    get,
    path = "/boxes/{id}/positions",
    params(
        ("id" = Uuid, Path, description = "Box ID")
    ),
    responses(
        (status = 200, description = "Occupied and free slots of the box", body = BoxOccupancyView),
        (status = 404, description = "Box not found")
    ),
    tag = "boxes",
    summary = "Get box grid"
)]
pub async fn get_box_positions(
    Path(box_id): Path<Uuid>,
    State(app_state): State<AppState>,
) -> Result<Json<BoxOccupancyView>, BusinessError> {
    Ok(Json(services::occupancy(&app_state.db, box_id).await?))
}

#[utoipa::path(
    get,
    path = "/boxes/{id}/free_positions",
    params(
        ("id" = Uuid, Path, description = "Box ID")
    ),
    responses(
        (status = 200, description = "Free slots in running order", body = Vec<SlotView>),
        (status = 404, description = "Box not found")
    ),
    tag = "boxes",
    summary = "Get free slots"
)]
pub async fn get_free_positions(
    Path(box_id): Path<Uuid>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<SlotView>>, BusinessError> {
    let free = services::free_positions(&app_state.db, box_id).await?;
    Ok(Json(free.into_iter().map(SlotView::free).collect()))
}
