use super::models::{HealthCheck, UIConfiguration};
use crate::config::{Config, test_helpers::setup_test_app};
use crate::test_helpers::send;
use axum::http::StatusCode;

#[test]
fn test_ui_configuration_from_config() {
    let config = Config::for_tests();
    let ui = UIConfiguration::from_config(&config);

    assert_eq!(ui.app_name, "sample-storage-api-test");
    assert_eq!(ui.deployment, "test");
    assert_eq!(ui.box_grid_columns, 10);

    let json = serde_json::to_value(&ui).unwrap();
    assert_eq!(json["appName"], "sample-storage-api-test");
    assert_eq!(json["boxGridColumns"], 10);
}

#[test]
fn test_health_check_serialization() {
    let health = HealthCheck {
        status: "ok".to_string(),
    };
    assert_eq!(serde_json::to_string(&health).unwrap(), r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_healthz_and_config_endpoints() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/api/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deployment"], "test");
}

#[tokio::test]
async fn test_not_found_error_body() {
    let app = setup_test_app().await;

    let (status, body) = send(&app, "GET", "/api/samples/by_sample_id/NOPE-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
    assert_eq!(body["error"]["type"], "NotFound");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("NOPE-1")
    );
}
