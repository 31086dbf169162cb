use crate::config::Config;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize, Serialize, Default)]
pub struct UIConfiguration {
    #[serde(rename = "appName")]
    pub app_name: String,
    pub deployment: String,
    /// Number of columns in a box grid; rows are lettered from A
    #[serde(rename = "boxGridColumns")]
    pub box_grid_columns: i32,
}

impl UIConfiguration {
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_name: config.app_name.clone(),
            deployment: config.deployment.clone(),
            box_grid_columns: crate::positions::models::BOX_GRID_COLUMNS,
        }
    }
}

#[derive(ToSchema, Deserialize, Serialize)]
pub struct HealthCheck {
    pub status: String,
}
