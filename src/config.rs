use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: Option<String>,
    pub app_name: String,
    pub deployment: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load from .env file if available
        let db_url = env::var("DB_URL").ok().or_else(|| {
            Some(format!(
                "{}://{}:{}@{}:{}/{}",
                env::var("DB_PREFIX").unwrap_or_else(|_| "postgresql".to_string()),
                env::var("DB_USER").expect("DB_USER must be set"),
                env::var("DB_PASSWORD").expect("DB_PASSWORD must be set"),
                env::var("DB_HOST").expect("DB_HOST must be set"),
                env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
                env::var("DB_NAME").expect("DB_NAME must be set"),
            ))
        });

        Config {
            app_name: env::var("APP_NAME").expect("APP_NAME must be set"),
            deployment: env::var("DEPLOYMENT")
                .expect("DEPLOYMENT must be set, this can be local, dev, stage, or prod"),
            db_url,
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            app_name: "sample-storage-api-test".to_string(),
            deployment: "test".to_string(),
            db_url: Some("sqlite::memory:".to_string()),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::Config;
    use crate::routes::build_router;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};

    /// Fresh in-memory database with all migrations applied.
    ///
    /// A single pooled connection keeps every query on the same in-memory database.
    pub async fn setup_test_db() -> DatabaseConnection {
        let config = Config::for_tests();
        let mut options = ConnectOptions::new(config.db_url.unwrap_or_default());
        options.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .expect("Failed to connect to test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run database migrations");

        db
    }

    pub async fn setup_test_app() -> Router {
        setup_test_app_with_db().await.0
    }

    /// Router plus a handle on the database behind it, for seeding fixtures directly
    pub async fn setup_test_app_with_db() -> (Router, DatabaseConnection) {
        let db = setup_test_db().await;
        let router = build_router(&db, &Config::for_tests());
        (router, db)
    }
}
