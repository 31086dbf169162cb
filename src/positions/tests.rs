use super::models::{
    self as positions, BOX_GRID_COLUMNS, FALLBACK_BOX_CAPACITY, MAX_BOX_CAPACITY, Slot,
};
use super::services::{
    assign, evict, free_positions, is_occupied, occupancy, position_of, write_position,
};
use crate::common::errors::BusinessError;
use crate::config::test_helpers::{setup_test_app_with_db, setup_test_db};
use crate::test_helpers::{loose_box, sample, send, storage_box};
use axum::http::StatusCode;
use rstest::rstest;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use std::collections::HashSet;

#[rstest]
#[case(1, 0, 0, "A1")]
#[case(10, 9, 0, "A10")]
#[case(11, 0, 1, "B1")]
#[case(91, 0, 9, "J1")]
#[case(100, 9, 9, "J10")]
#[case(MAX_BOX_CAPACITY, 9, 25, "Z10")]
fn slot_numbering(#[case] n: i32, #[case] x: i32, #[case] y: i32, #[case] label: &str) {
    let slot = Slot::from_number(n);
    assert_eq!(slot, Slot::new(x, y));
    assert_eq!(slot.number(), n);
    assert_eq!(slot.label(), label);
}

#[test]
fn external_labels_are_normalized_to_zero_based() {
    assert_eq!(Slot::from_external(1, "A").unwrap(), Slot::new(0, 0));
    assert_eq!(Slot::from_external(3, "c").unwrap(), Slot::new(2, 2));
    assert_eq!(
        Slot::from_external(BOX_GRID_COLUMNS, "J").unwrap(),
        Slot::new(9, 9)
    );
}

#[rstest]
#[case(0, "A")]
#[case(11, "A")]
#[case(1, "")]
#[case(1, "AB")]
#[case(1, "3")]
fn malformed_external_labels_are_rejected(#[case] column: i32, #[case] row: &str) {
    assert!(matches!(
        Slot::from_external(column, row),
        Err(BusinessError::ValidationError { .. })
    ));
}

#[test]
fn rows_past_z_have_no_letter() {
    assert_eq!(Slot::new(0, 25).row_letter(), 'Z');
    assert_eq!(Slot::from_number(MAX_BOX_CAPACITY + 1).row_letter(), '?');
}

#[test]
fn slots_beyond_capacity_are_outside() {
    assert!(Slot::new(0, 9).is_within(91));
    assert!(!Slot::new(1, 9).is_within(91));
    assert!(!Slot::new(-1, 0).is_within(100));
    assert!(!Slot::new(10, 0).is_within(100));
}

#[tokio::test]
async fn test_empty_box_lists_every_slot_as_free() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;

    let free = free_positions(&db, fixture.storage_box.id).await.unwrap();
    assert_eq!(free.len(), 100);
    assert_eq!(free.first(), Some(&Slot::new(0, 0)));
    assert_eq!(free.last(), Some(&Slot::new(9, 9)));
}

#[tokio::test]
async fn test_box_without_capacity_uses_fallback_bound() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let legacy = storage_box(&db, "Legacy", None, (None, None, Some(fixture.freezer.id))).await;

    let free = free_positions(&db, legacy.id).await.unwrap();
    assert_eq!(free.len(), usize::try_from(FALLBACK_BOX_CAPACITY).unwrap());
}

#[tokio::test]
async fn test_free_and_occupied_partition_the_box() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let box_id = fixture.storage_box.id;
    for (i, n) in [1, 7, 42, 100].into_iter().enumerate() {
        let sample_id = format!("S-{i}");
        sample(&db, &sample_id, None).await;
        assign(&db, &sample_id, box_id, Slot::from_number(n))
            .await
            .unwrap();
    }

    let view = occupancy(&db, box_id).await.unwrap();
    let free: HashSet<(i32, i32)> = view.free.iter().map(|s| (s.x_position, s.y_position)).collect();
    let occupied: HashSet<(i32, i32)> = view
        .occupied
        .iter()
        .map(|s| (s.x_position, s.y_position))
        .collect();

    assert_eq!(occupied.len(), 4);
    assert_eq!(free.len(), 96);
    assert!(free.is_disjoint(&occupied));
    let all: HashSet<(i32, i32)> = (1..=100)
        .map(Slot::from_number)
        .map(|s| (s.x, s.y))
        .collect();
    assert_eq!(&free | &occupied, all);
}

#[tokio::test]
async fn test_assign_conflict_and_move_scenario() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let box_id = fixture.storage_box.id;
    sample(&db, "S1", None).await;
    sample(&db, "S2", None).await;

    assign(&db, "S1", box_id, Slot::new(0, 0)).await.unwrap();
    assert!(is_occupied(&db, box_id, Slot::new(0, 0)).await.unwrap());

    match assign(&db, "S2", box_id, Slot::new(0, 0)).await {
        Err(BusinessError::PositionConflict {
            sample_id,
            occupied_by,
            slot,
            ..
        }) => {
            assert_eq!(sample_id, "S2");
            assert_eq!(occupied_by.as_deref(), Some("S1"));
            assert_eq!(slot, "A1");
        }
        other => panic!("Expected position conflict, got {other:?}"),
    }
    assert!(position_of(&db, "S2").await.unwrap().is_none());

    let moved = assign(&db, "S1", box_id, Slot::new(1, 0)).await.unwrap();
    assert_eq!(moved.slot(), Slot::new(1, 0));
    assert!(!is_occupied(&db, box_id, Slot::new(0, 0)).await.unwrap());

    let rows = positions::Entity::find()
        .filter(positions::Column::SampleId.eq("S1"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_assign_to_current_slot_is_a_no_op() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    sample(&db, "S1", None).await;

    let first = assign(&db, "S1", fixture.storage_box.id, Slot::new(4, 2))
        .await
        .unwrap();
    let again = assign(&db, "S1", fixture.storage_box.id, Slot::new(4, 2))
        .await
        .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(positions::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_assign_moves_between_boxes() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let other = storage_box(&db, "B2", Some(50), (None, None, Some(fixture.freezer.id))).await;
    sample(&db, "S1", None).await;

    assign(&db, "S1", fixture.storage_box.id, Slot::new(0, 0))
        .await
        .unwrap();
    assign(&db, "S1", other.id, Slot::new(0, 0)).await.unwrap();

    let position = position_of(&db, "S1").await.unwrap().unwrap();
    assert_eq!(position.box_id, other.id);
    assert_eq!(
        free_positions(&db, fixture.storage_box.id).await.unwrap().len(),
        100
    );
}

#[tokio::test]
async fn test_assign_rejects_unknown_sample_box_and_out_of_range_slot() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let small = storage_box(&db, "Small", Some(12), (None, None, Some(fixture.freezer.id))).await;
    sample(&db, "S1", None).await;

    assert!(matches!(
        assign(&db, "GHOST", fixture.storage_box.id, Slot::new(0, 0)).await,
        Err(BusinessError::NotFound { .. })
    ));
    assert!(matches!(
        assign(&db, "S1", uuid::Uuid::new_v4(), Slot::new(0, 0)).await,
        Err(BusinessError::NotFound { .. })
    ));
    assert!(matches!(
        assign(&db, "S1", small.id, Slot::new(2, 1)).await,
        Err(BusinessError::ValidationError { .. })
    ));
    assert!(position_of(&db, "S1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_uniqueness_holds_after_mixed_assign_and_evict() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let box_id = fixture.storage_box.id;
    for id in ["S1", "S2", "S3"] {
        sample(&db, id, None).await;
    }

    assign(&db, "S1", box_id, Slot::new(0, 0)).await.unwrap();
    assign(&db, "S2", box_id, Slot::new(1, 0)).await.unwrap();
    assert!(assign(&db, "S3", box_id, Slot::new(1, 0)).await.is_err());
    assert!(evict(&db, "S2").await.unwrap());
    assert!(!evict(&db, "S2").await.unwrap());
    assign(&db, "S3", box_id, Slot::new(1, 0)).await.unwrap();
    assign(&db, "S1", box_id, Slot::new(2, 0)).await.unwrap();

    let all = positions::Entity::find().all(&db).await.unwrap();
    let slots: HashSet<(uuid::Uuid, i32, i32)> = all
        .iter()
        .map(|p| (p.box_id, p.x_position, p.y_position))
        .collect();
    let samples: HashSet<&str> = all.iter().map(|p| p.sample_id.as_str()).collect();
    assert_eq!(all.len(), 2);
    assert_eq!(slots.len(), all.len());
    assert_eq!(samples.len(), all.len());
}

#[tokio::test]
async fn test_place_and_remove_sample_over_http() {
    let (app, db) = setup_test_app_with_db().await;
    let fixture = loose_box(&db).await;
    sample(&db, "S1", None).await;
    sample(&db, "S2", None).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/samples/by_sample_id/S1/position",
        Some(json!({"box_id": fixture.storage_box.id, "column": 3, "row": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["x_position"], 2);
    assert_eq!(body["y_position"], 1);
    assert_eq!(body["label"], "B3");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/samples/by_sample_id/S2/position",
        Some(json!({"box_id": fixture.storage_box.id, "column": 3, "row": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "POSITION_CONFLICT");
    assert_eq!(body["error"]["occupied_by"], "S1");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/boxes/{}/positions", fixture.storage_box.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["occupied"].as_array().unwrap().len(), 1);
    assert_eq!(body["free"].as_array().unwrap().len(), 99);

    let (status, _) = send(&app, "DELETE", "/api/samples/by_sample_id/S1/position", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(position_of(&db, "S1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_write_losing_the_slot_to_another_sample_is_a_conflict() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let box_id = fixture.storage_box.id;
    sample(&db, "S1", None).await;
    sample(&db, "S2", None).await;

    // S2 found A1 free, then S1 was placed there before S2 wrote
    assign(&db, "S1", box_id, Slot::new(0, 0)).await.unwrap();
    match write_position(&db, "S2", box_id, Slot::new(0, 0), None).await {
        Err(BusinessError::PositionConflict {
            sample_id,
            slot,
            occupied_by,
            ..
        }) => {
            assert_eq!(sample_id, "S2");
            assert_eq!(slot, "A1");
            assert_eq!(occupied_by, None);
        }
        other => panic!("Expected position conflict, got {other:?}"),
    }

    assert!(position_of(&db, "S2").await.unwrap().is_none());
    let holder = position_of(&db, "S1").await.unwrap().unwrap();
    assert_eq!(holder.slot(), Slot::new(0, 0));
}

#[tokio::test]
async fn test_placing_one_sample_twice_from_stale_reads_keeps_one_position() {
    let db = setup_test_db().await;
    let fixture = loose_box(&db).await;
    let box_id = fixture.storage_box.id;
    sample(&db, "S1", None).await;

    // Both writers saw S1 unplaced
    write_position(&db, "S1", box_id, Slot::new(0, 0), None)
        .await
        .unwrap();
    assert!(matches!(
        write_position(&db, "S1", box_id, Slot::new(1, 0), None).await,
        Err(BusinessError::PositionConflict { .. })
    ));

    let rows = positions::Entity::find()
        .filter(positions::Column::SampleId.eq("S1"))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].slot(), Slot::new(0, 0));
    assert!(!is_occupied(&db, box_id, Slot::new(1, 0)).await.unwrap());
}
