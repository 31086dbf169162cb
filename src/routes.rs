use crate::common::state::AppState;
use crate::config::Config;
use crate::{
    boxes, capacity, containment, facilities, freezers, racks, relocation, sample_statuses,
    sample_types, samples, shelves, source_files,
};
use axum::{Router, extract::DefaultBodyLimit};
use sea_orm::DatabaseConnection;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(db: &DatabaseConnection, config: &Config) -> Router {
    #[derive(OpenApi)]
    #[openapi(info(
        title = "Sample Storage API",
        description = "Facilities, freezers, shelves, racks and boxes holding biological samples"
    ))]
    struct ApiDoc;

    let app_state: AppState = AppState::new(db.clone(), config.clone());

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state))
        .nest("/api/facilities", facilities::views::router(&app_state))
        .nest("/api/freezers", freezers::views::router(&app_state))
        .nest("/api/shelves", shelves::views::router(&app_state))
        .nest("/api/racks", racks::views::router(&app_state))
        .nest("/api/boxes", boxes::views::router(&app_state))
        .nest("/api/sample_types", sample_types::views::router(&app_state))
        .nest("/api/source_files", source_files::views::router(&app_state))
        .nest(
            "/api/sample_statuses",
            sample_statuses::views::router(&app_state),
        )
        .nest("/api/samples", samples::views::router(&app_state))
        .nest("/api/containment", containment::views::router(&app_state))
        .nest("/api/capacity", capacity::views::router(&app_state))
        .nest("/api/relocations", relocation::views::router(&app_state))
        .split_for_parts();

    router
        .merge(Scalar::with_url("/api/docs", api))
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
}
