use super::models::router as crudrouter;
use crate::common::state::AppState;
use utoipa_axum::router::OpenApiRouter;

pub fn router(state: &AppState) -> OpenApiRouter {
    crudrouter(&state.db.clone())
}
