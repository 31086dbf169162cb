use super::services::{aggregate_scope, breakdown, facility_overview};
use crate::config::test_helpers::{setup_test_app_with_db, setup_test_db};
use crate::containment::models::{ContainerKind, ContainerRef};
use crate::containment::services::load;
use crate::positions::{models::Slot, services::assign};
use crate::test_helpers::{facility, freezer, loose_box, rack, sample, send, shelf, storage_box};
use axum::http::StatusCode;

#[tokio::test]
async fn test_empty_boxes_do_not_count_until_a_sample_is_placed() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let scope = ContainerRef::freezer(fixture.freezer.id);

    let before = aggregate_scope(&db, scope).await.unwrap();
    assert_eq!(before.capacity, 0);
    assert_eq!(before.stored, 0);
    assert_eq!(before.boxes, 1);
    assert!(before.percent_filled.abs() < f64::EPSILON);

    sample(&db, "S1", None).await;
    assign(&db, "S1", fixture.storage_box.id, Slot::new(0, 0))
        .await
        .unwrap();

    let after = aggregate_scope(&db, scope).await.unwrap();
    assert_eq!(after.capacity, 100);
    assert_eq!(after.stored, 1);
    assert_eq!(after.occupied_boxes, 1);
    assert!((after.percent_filled - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_box_without_capacity_counts_fallback_slots() {
    let db = setup_test_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let legacy = storage_box(&db, "Legacy", None, (None, None, Some(f1.id))).await;
    sample(&db, "S1", None).await;
    assign(&db, "S1", legacy.id, Slot::new(0, 0)).await.unwrap();

    let summary = aggregate_scope(&db, ContainerRef::freezer(f1.id))
        .await
        .unwrap();
    assert_eq!(summary.capacity, 91);
    assert_eq!(summary.available(), 90);
}

#[tokio::test]
async fn test_breakdown_lists_non_empty_children_only() {
    let db = setup_test_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let s1 = shelf(&db, f1.id, "S1").await;
    let s2 = shelf(&db, f1.id, "S2").await;
    let r1 = rack(&db, None, Some(f1.id), "R1").await;
    let on_shelf = storage_box(&db, "A", Some(50), (None, Some(s1.id), None)).await;
    storage_box(&db, "B", Some(100), (None, Some(s2.id), None)).await;
    let in_rack = storage_box(&db, "C", Some(100), (Some(r1.id), None, None)).await;

    for (i, target) in [on_shelf.id, on_shelf.id, in_rack.id].into_iter().enumerate() {
        let sample_id = format!("S-{i}");
        sample(&db, &sample_id, None).await;
        assign(&db, &sample_id, target, Slot::from_number(i32::try_from(i).unwrap() + 1))
            .await
            .unwrap();
    }

    let report = breakdown(&db, ContainerRef::freezer(f1.id)).await.unwrap();
    assert_eq!(report.name, "F1");
    assert_eq!(report.totals.stored, 3);
    assert_eq!(report.totals.capacity, 150);
    assert_eq!(report.totals.boxes, 3);

    let children: Vec<(ContainerKind, &str, i64)> = report
        .children
        .iter()
        .map(|c| (c.kind, c.name.as_str(), c.stored))
        .collect();
    assert_eq!(
        children,
        vec![
            (ContainerKind::Shelf, "S1", 2),
            (ContainerKind::Rack, "R1", 1),
        ]
    );
    let shelf_child = &report.children[0];
    assert_eq!(shelf_child.capacity, 50);
    assert!((shelf_child.percent_filled - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_facility_overview_counts_every_box() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    storage_box(&db, "Spare", Some(100), (None, None, Some(fixture.freezer.id))).await;
    facility(&db, "Empty site").await;
    sample(&db, "S1", None).await;
    assign(&db, "S1", fixture.storage_box.id, Slot::new(3, 3))
        .await
        .unwrap();

    let overview = facility_overview(&db).await.unwrap();
    assert_eq!(overview.len(), 2);

    let empty = &overview[0];
    assert_eq!(empty.name, "Empty site");
    assert_eq!(empty.boxes, 0);
    assert_eq!(empty.stored, 0);

    let main = &overview[1];
    assert_eq!(main.facility_id, fixture.facility.id);
    assert_eq!(main.boxes, 2);
    assert_eq!(main.stored, 1);
    assert_eq!(main.capacity, 100);
    assert_eq!(main.available, 99);
}

#[tokio::test]
async fn test_capacity_endpoints() {
    let (app, db) = setup_test_app_with_db().await;
    let fixture = loose_box(&db).await;
    sample(&db, "S1", None).await;
    assign(&db, "S1", fixture.storage_box.id, Slot::new(0, 0))
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", "/api/capacity/facilities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["stored"], 1);
    assert_eq!(body[0]["available"], 99);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/capacity/freezer/{}", fixture.freezer.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totals"]["capacity"], 100);
    assert_eq!(body["children"][0]["kind"], "box");
    assert_eq!(body["children"][0]["name"], "B1");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/capacity/rack/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_every_container_kind_reports_its_capacity() {
    let db = setup_test_db().await;
    let site = facility(&db, "Site").await;
    let f1 = freezer(&db, site.id, "F1").await;
    let s1 = shelf(&db, f1.id, "S1").await;
    let r1 = rack(&db, Some(s1.id), None, "R1").await;
    let bx = storage_box(&db, "Bx", Some(50), (Some(r1.id), None, None)).await;
    storage_box(&db, "Empty", Some(100), (Some(r1.id), None, None)).await;
    sample(&db, "S1", None).await;
    assign(&db, "S1", bx.id, Slot::new(0, 0)).await.unwrap();

    for scope in [
        ContainerRef::facility(site.id),
        ContainerRef::freezer(f1.id),
        ContainerRef::shelf(s1.id),
        ContainerRef::rack(r1.id),
        ContainerRef::storage_box(bx.id),
    ] {
        let container = load(&db, scope).await.unwrap();
        let summary = container.capacity(&db).await.unwrap();
        assert_eq!(summary.capacity, 50, "{:?}", scope.kind);
        assert_eq!(summary.stored, 1, "{:?}", scope.kind);
        assert!((summary.percent_filled - 2.0).abs() < 1e-9);
    }
}
