/// Builders for the storage hierarchy, written straight to the database so tests can
/// set up states the API refuses to create (legacy multi-parent rows, missing capacity).
use crate::{boxes, facilities, freezers, racks, sample_statuses, samples, shelves};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

pub async fn extract_response_body(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body: Value =
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
    (status, body)
}

/// Send a request with an optional JSON body and decode the response
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |json| Body::from(json.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    extract_response_body(response).await
}

pub async fn facility(db: &DatabaseConnection, name: &str) -> facilities::models::Model {
    let now = chrono::Utc::now();
    facilities::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert facility")
}

pub async fn freezer(db: &DatabaseConnection, facility_id: Uuid, name: &str) -> freezers::models::Model {
    let now = chrono::Utc::now();
    freezers::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        facility_id: Set(facility_id),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert freezer")
}

pub async fn shelf(db: &DatabaseConnection, freezer_id: Uuid, name: &str) -> shelves::models::Model {
    let now = chrono::Utc::now();
    shelves::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        freezer_id: Set(freezer_id),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert shelf")
}

pub async fn rack(
    db: &DatabaseConnection,
    shelf_id: Option<Uuid>,
    freezer_id: Option<Uuid>,
    name: &str,
) -> racks::models::Model {
    let now = chrono::Utc::now();
    racks::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        shelf_id: Set(shelf_id),
        freezer_id: Set(freezer_id),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert rack")
}

/// Box with raw parent columns, `(rack_id, shelf_id, freezer_id)`
pub async fn storage_box(
    db: &DatabaseConnection,
    name: &str,
    capacity: Option<i32>,
    parents: (Option<Uuid>, Option<Uuid>, Option<Uuid>),
) -> boxes::models::Model {
    let now = chrono::Utc::now();
    let (rack_id, shelf_id, freezer_id) = parents;
    boxes::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        capacity: Set(capacity),
        rack_id: Set(rack_id),
        shelf_id: Set(shelf_id),
        freezer_id: Set(freezer_id),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert box")
}

pub async fn sample_status(db: &DatabaseConnection, name: &str) -> sample_statuses::models::Model {
    let now = chrono::Utc::now();
    sample_statuses::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert sample status")
}

pub async fn sample(
    db: &DatabaseConnection,
    sample_id: &str,
    status_id: Option<Uuid>,
) -> samples::models::Model {
    let now = chrono::Utc::now();
    samples::models::ActiveModel {
        id: Set(Uuid::new_v4()),
        sample_id: Set(sample_id.to_string()),
        protocol_number: Set(Some("PROTO-1".to_string())),
        participant_id: Set(Some(format!("P-{sample_id}"))),
        gender: Set(None),
        date_of_birth: Set(None),
        date_sampled: Set(None),
        time_sampled: Set(None),
        sample_condition: Set(None),
        user_created: Set(None),
        visit_code: Set(None),
        requisition_id: Set(None),
        sample_type_id: Set(None),
        source_file_id: Set(None),
        sample_status_id: Set(status_id),
        created_at: Set(now),
        last_updated: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert sample")
}

/// Facility → freezer with one box of capacity 100 loose in the freezer
pub struct LooseBox {
    pub facility: facilities::models::Model,
    pub freezer: freezers::models::Model,
    pub storage_box: boxes::models::Model,
}

pub async fn loose_box(db: &DatabaseConnection) -> LooseBox {
    let facility = facility(db, "Main campus").await;
    let freezer = freezer(db, facility.id, "Freezer 1").await;
    let storage_box = storage_box(db, "B1", Some(100), (None, None, Some(freezer.id))).await;
    LooseBox {
        facility,
        freezer,
        storage_box,
    }
}
