mod boxes;
mod capacity;
mod common;
mod config;
mod containment;
mod facilities;
mod freezers;
mod notes;
mod positions;
mod racks;
mod relocation;
mod routes;
mod sample_statuses;
mod sample_types;
mod samples;
mod shelves;
mod source_files;

#[cfg(test)]
mod test_helpers;

use crate::config::Config;
use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    info!("Starting server...");

    let config: Config = Config::from_env();

    let db_url = config
        .db_url
        .as_deref()
        .context("no database URL configured")?;
    let db: DatabaseConnection = Database::connect(db_url)
        .await
        .context("failed to connect to the database")?;

    if db.ping().await.is_ok() {
        info!("Connected to the database");
    } else {
        warn!("Could not ping the database");
    }

    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;
    info!("DB migrations complete");

    info!(
        "Starting server {} ({} deployment) ...",
        config.app_name,
        config.deployment.to_uppercase()
    );

    let addr: std::net::SocketAddr = "0.0.0.0:3000".parse()?;
    info!("Listening on {addr}");

    let router = routes::build_router(&db, &config);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router.into_make_service())
        .await
        .context("server stopped unexpectedly")?;
    Ok(())
}
