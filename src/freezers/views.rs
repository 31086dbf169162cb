use super::models::router as crudrouter;
use crate::boxes::models::StorageBox;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::containment::{models::ContainerRef, services::boxes_within};
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    crudrouter(&state.db.clone()).route(
        "/{id}/boxes",
        get(get_freezer_boxes).with_state(state.clone()),
    )
}

/// Boxes stored anywhere in a freezer: loose, on a shelf, or in a rack
#[utoipa::path(
    get,
    path = "/freezers/{id}/boxes",
    params(
        ("id" = Uuid, Path, description = "Freezer ID")
    ),
    responses(
        (status = 200, description = "Boxes in this freezer", body = Vec<StorageBox>),
        (status = 404, description = "Freezer not found")
    ),
    tag = "freezers",
    summary = "Get freezer boxes"
)]
pub async fn get_freezer_boxes(
    Path(freezer_id): Path<Uuid>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<StorageBox>>, BusinessError> {
    let boxes = boxes_within(&app_state.db, ContainerRef::freezer(freezer_id)).await?;
    Ok(Json(boxes.into_iter().map(Into::into).collect()))
}
