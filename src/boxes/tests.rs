use super::models::check_shrink;
use crate::common::errors::BusinessError;
use crate::config::test_helpers::{setup_test_app_with_db, setup_test_db};
use crate::positions::models::{MAX_BOX_CAPACITY, Slot};
use crate::positions::services::{assign, occupancy};
use crate::test_helpers::{facility, freezer, loose_box, rack, sample, send, shelf, storage_box};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_create_box_defaults_capacity() {
    let (app, db) = setup_test_app_with_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/boxes",
        Some(json!({"name": "B1", "freezer_id": f1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body:?}");
    assert_eq!(body["capacity"], 100);
    assert_eq!(body["freezer_id"], json!(f1.id));

    let (status, body) = send(
        &app,
        "POST",
        "/api/boxes",
        Some(json!({"name": "Unattached", "capacity": 81})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body:?}");
    assert_eq!(body["capacity"], 81);
    assert!(body["rack_id"].is_null());
    assert!(body["shelf_id"].is_null());
    assert!(body["freezer_id"].is_null());
}

#[tokio::test]
async fn test_create_box_rejects_several_parents_and_bad_capacity() {
    let (app, db) = setup_test_app_with_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let s1 = shelf(&db, f1.id, "S1").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/boxes",
        Some(json!({"name": "Both", "shelf_id": s1.id, "freezer_id": f1.id})),
    )
    .await;
    assert!(!status.is_success());

    for capacity in [0, -5, MAX_BOX_CAPACITY + 1] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/boxes",
            Some(json!({"name": "Bad", "freezer_id": f1.id, "capacity": capacity})),
        )
        .await;
        assert!(!status.is_success(), "capacity {capacity} should be refused");
    }
}

#[tokio::test]
async fn test_update_box_cannot_add_a_second_parent() {
    let (app, db) = setup_test_app_with_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let r1 = rack(&db, None, Some(f1.id), "R1").await;
    let bx = storage_box(&db, "B1", Some(100), (Some(r1.id), None, None)).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/boxes/{}", bx.id),
        Some(json!({"freezer_id": f1.id})),
    )
    .await;
    assert!(!status.is_success());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/boxes/{}", bx.id),
        Some(json!({"name": "Renamed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["rack_id"], json!(r1.id));
}

#[tokio::test]
async fn test_move_box_endpoint() {
    let (app, db) = setup_test_app_with_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let s1 = shelf(&db, f1.id, "S1").await;
    let bx = storage_box(&db, "B1", Some(100), (None, None, Some(f1.id))).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/boxes/{}/parent", bx.id),
        Some(json!({"kind": "shelf", "id": s1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["shelf_id"], json!(s1.id));
    assert!(body["freezer_id"].is_null());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/boxes/{}/parent", bx.id),
        Some(json!({"kind": "unattached"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert!(body["shelf_id"].is_null());

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/boxes/{}/parent", bx.id),
        Some(json!({"kind": "freezer", "id": uuid::Uuid::new_v4()})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_free_positions_endpoint() {
    let (app, db) = setup_test_app_with_db().await;
    let bx = storage_box(&db, "Small", Some(12), (None, None, None)).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/boxes/{}/free_positions", bx.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let free = body.as_array().unwrap();
    assert_eq!(free.len(), 12);
    assert_eq!(free[11]["label"], "B2");
}

#[tokio::test]
async fn test_largest_labelled_capacity_is_accepted() {
    let (app, _db) = setup_test_app_with_db().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/boxes",
        Some(json!({"name": "Large", "capacity": MAX_BOX_CAPACITY})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body:?}");
    assert_eq!(body["capacity"], MAX_BOX_CAPACITY);
}

#[tokio::test]
async fn test_capacity_cannot_drop_below_an_occupied_slot() {
    let (app, db) = setup_test_app_with_db().await;
    let fixture = loose_box(&db).await;
    let box_id = fixture.storage_box.id;
    sample(&db, "S1", None).await;
    assign(&db, "S1", box_id, Slot::from_number(90)).await.unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/boxes/{box_id}"),
        Some(json!({"capacity": 10})),
    )
    .await;
    assert!(!status.is_success());

    let view = occupancy(&db, box_id).await.unwrap();
    assert_eq!(view.slot_count, 100);
    assert_eq!(view.occupied.len(), 1);
    assert_eq!(view.free.len(), 99);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/boxes/{box_id}"),
        Some(json!({"capacity": 90})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["capacity"], 90);
}

#[tokio::test]
async fn test_clearing_capacity_falls_back_only_when_samples_fit() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let box_id = fixture.storage_box.id;
    sample(&db, "S1", None).await;
    assign(&db, "S1", box_id, Slot::from_number(95)).await.unwrap();

    assert!(matches!(
        check_shrink(&db, box_id, None).await,
        Err(BusinessError::ValidationError { .. })
    ));
    assert!(check_shrink(&db, box_id, Some(95)).await.is_ok());

    assign(&db, "S1", box_id, Slot::from_number(91)).await.unwrap();
    assert!(check_shrink(&db, box_id, None).await.is_ok());
}
