use super::models::{
    BulkStatusChange, InventorySummary, Sample, SampleLocation, StatusChange, StatusChangeReport,
    router as crudrouter,
};
use super::services;
use crate::common::errors::BusinessError;
use crate::common::state::AppState;
use crate::notes::models::{Note, NoteCreate};
use crate::positions::models::{PlacedPosition, PositionInput, Slot};
use crate::{notes, positions};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post, put};
use utoipa_axum::router::OpenApiRouter;

pub fn router(state: &AppState) -> OpenApiRouter {
    crudrouter(&state.db.clone())
        .route("/summary", get(get_summary).with_state(state.clone()))
        .route("/status", post(change_status_many).with_state(state.clone()))
        .route(
            "/by_sample_id/{sample_id}",
            get(get_sample_location).with_state(state.clone()),
        )
        .route(
            "/by_sample_id/{sample_id}/position",
            get(get_sample_position)
                .put(place_sample)
                .delete(remove_sample)
                .with_state(state.clone()),
        )
        .route(
            "/by_sample_id/{sample_id}/notes",
            get(get_notes).post(add_note).with_state(state.clone()),
        )
        .route(
            "/by_sample_id/{sample_id}/status",
            put(change_status).with_state(state.clone()),
        )
}

#[utoipa::path(
    get,
    path = "/samples/summary",
    responses(
        (status = 200, description = "Inventory totals", body = InventorySummary)
    ),
    tag = "samples",
    summary = "Inventory summary"
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
) -> Result<Json<InventorySummary>, BusinessError> {
    Ok(Json(services::summary(&app_state.db).await?))
}

/// Sample attributes, position label and containment, for label printing and scanning
#[utoipa::path(
    get,
    path = "/samples/by_sample_id/{sample_id}",
    params(
        ("sample_id" = String, Path, description = "External sample identifier")
    ),
    responses(
        (status = 200, description = "Sample and where it is stored", body = SampleLocation),
        (status = 404, description = "Sample not found")
    ),
    tag = "samples",
    summary = "Locate sample"
)]
pub async fn get_sample_location(
    Path(sample_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<SampleLocation>, BusinessError> {
    Ok(Json(services::locate(&app_state.db, &sample_id).await?))
}

#[utoipa::path(
    get,
    path = "/samples/by_sample_id/{sample_id}/position",
    params(
        ("sample_id" = String, Path, description = "External sample identifier")
    ),
    responses(
        (status = 200, description = "Current position, null when unplaced", body = Option<PlacedPosition>),
        (status = 404, description = "Sample not found")
    ),
    tag = "samples",
    summary = "Get sample position"
)]
pub async fn get_sample_position(
    Path(sample_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Option<PlacedPosition>>, BusinessError> {
    services::find_by_sample_id(&app_state.db, &sample_id).await?;
    let position = positions::services::position_of(&app_state.db, &sample_id).await?;
    Ok(Json(position.map(Into::into)))
}

/// Place a sample, or move it if it is already placed
#[utoipa::path(
    put,
    path = "/samples/by_sample_id/{sample_id}/position",
    params(
        ("sample_id" = String, Path, description = "External sample identifier")
    ),
    request_body = PositionInput,
    responses(
        (status = 200, description = "Sample placed", body = PlacedPosition),
        (status = 400, description = "Column or row out of range"),
        (status = 404, description = "Sample or box not found"),
        (status = 409, description = "Slot holds another sample")
    ),
    tag = "samples",
    summary = "Place sample"
)]
pub async fn place_sample(
    Path(sample_id): Path<String>,
    State(app_state): State<AppState>,
    Json(input): Json<PositionInput>,
) -> Result<Json<PlacedPosition>, BusinessError> {
    let slot = Slot::from_external(input.column, &input.row)?;
    let placed =
        positions::services::assign(&app_state.db, &sample_id, input.box_id, slot).await?;
    Ok(Json(placed.into()))
}

#[utoipa::path(
    delete,
    path = "/samples/by_sample_id/{sample_id}/position",
    params(
        ("sample_id" = String, Path, description = "External sample identifier")
    ),
    responses(
        (status = 204, description = "Sample is no longer placed"),
        (status = 404, description = "Sample not found")
    ),
    tag = "samples",
    summary = "Remove sample from its box"
)]
pub async fn remove_sample(
    Path(sample_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<StatusCode, BusinessError> {
    services::find_by_sample_id(&app_state.db, &sample_id).await?;
    positions::services::evict(&app_state.db, &sample_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/samples/by_sample_id/{sample_id}/notes",
    params(
        ("sample_id" = String, Path, description = "External sample identifier")
    ),
    responses(
        (status = 200, description = "Notes, oldest first", body = Vec<Note>),
        (status = 404, description = "Sample not found")
    ),
    tag = "samples",
    summary = "List sample notes"
)]
pub async fn get_notes(
    Path(sample_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Note>>, BusinessError> {
    Ok(Json(notes::services::list(&app_state.db, &sample_id).await?))
}

#[utoipa::path(
    post,
    path = "/samples/by_sample_id/{sample_id}/notes",
    params(
        ("sample_id" = String, Path, description = "External sample identifier")
    ),
    request_body = NoteCreate,
    responses(
        (status = 201, description = "Note added", body = Note),
        (status = 400, description = "Empty note"),
        (status = 404, description = "Sample not found")
    ),
    tag = "samples",
    summary = "Add sample note"
)]
pub async fn add_note(
    Path(sample_id): Path<String>,
    State(app_state): State<AppState>,
    Json(input): Json<NoteCreate>,
) -> Result<(StatusCode, Json<Note>), BusinessError> {
    let note = notes::services::append(&app_state.db, &sample_id, input).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[utoipa::path(
    put,
    path = "/samples/by_sample_id/{sample_id}/status",
    params(
        ("sample_id" = String, Path, description = "External sample identifier")
    ),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status changed", body = Sample),
        (status = 404, description = "Sample or status not found")
    ),
    tag = "samples",
    summary = "Change sample status"
)]
pub async fn change_status(
    Path(sample_id): Path<String>,
    State(app_state): State<AppState>,
    Json(input): Json<StatusChange>,
) -> Result<Json<Sample>, BusinessError> {
    let (sample, _) =
        services::set_status(&app_state.db, &sample_id, input.sample_status_id).await?;
    Ok(Json(sample.into()))
}

#[utoipa::path(
    post,
    path = "/samples/status",
    request_body = BulkStatusChange,
    responses(
        (status = 200, description = "Per-sample outcome", body = StatusChangeReport),
        (status = 404, description = "Status not found")
    ),
    tag = "samples",
    summary = "Change status of many samples"
)]
pub async fn change_status_many(
    State(app_state): State<AppState>,
    Json(input): Json<BulkStatusChange>,
) -> Result<Json<StatusChangeReport>, BusinessError> {
    Ok(Json(
        services::set_status_many(&app_state.db, &input.sample_ids, input.sample_status_id)
            .await?,
    ))
}
