use crate::config::test_helpers::setup_test_app_with_db;
use crate::test_helpers::{facility, freezer, rack, send, shelf};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_rack_hangs_from_a_shelf_or_a_freezer() {
    let (app, db) = setup_test_app_with_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let s1 = shelf(&db, f1.id, "S1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/racks",
        Some(json!({"name": "On shelf", "shelf_id": s1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body:?}");
    assert_eq!(body["shelf_id"], json!(s1.id));
    assert!(body["freezer_id"].is_null());

    let (status, body) = send(
        &app,
        "POST",
        "/api/racks",
        Some(json!({"name": "In freezer", "freezer_id": f1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body:?}");
    assert_eq!(body["freezer_id"], json!(f1.id));
}

#[tokio::test]
async fn test_rack_needs_exactly_one_parent() {
    let (app, db) = setup_test_app_with_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let s1 = shelf(&db, f1.id, "S1").await;

    let (status, _) = send(&app, "POST", "/api/racks", Some(json!({"name": "Orphan"}))).await;
    assert!(!status.is_success());

    let (status, _) = send(
        &app,
        "POST",
        "/api/racks",
        Some(json!({"name": "Both", "shelf_id": s1.id, "freezer_id": f1.id})),
    )
    .await;
    assert!(!status.is_success());

    let existing = rack(&db, Some(s1.id), None, "R1").await;
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/racks/{}", existing.id),
        Some(json!({"freezer_id": f1.id})),
    )
    .await;
    assert!(!status.is_success());

    let (status, body) = send(&app, "GET", &format!("/api/racks/{}", existing.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shelf_id"], json!(s1.id));
    assert!(body["freezer_id"].is_null());
}
