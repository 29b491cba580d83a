use agenda_common::models::{SchedulingSettings, Service, TimeRange};
use agenda_db::{DbClient, SchedulingStoreFactory, SqlSchedulingStore};
use agenda_slots::routes::routes;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// Helper function to create a SQL-backed store with one bookable professional
async fn create_store() -> SqlSchedulingStore {
    let client = DbClient::from_url("sqlite::memory:").await.unwrap();
    let store = SchedulingStoreFactory::new().sql_store(client).await.unwrap();

    store
        .save_settings(&SchedulingSettings {
            user_id: "pro-1".to_string(),
            working_hours: Some(TimeRange::new("09:00", "18:00")),
            lunch_break: Some(TimeRange::new("12:00", "13:00")),
            public_scheduling_enabled: Some(true),
            ..SchedulingSettings::default()
        })
        .await
        .unwrap();
    store
        .save_service(&Service {
            id: String::new(),
            name: "Corte".to_string(),
            price: 50.0,
            duration: 60,
            user_id: "pro-1".to_string(),
        })
        .await
        .unwrap();
    store
}

async fn call(store: &SqlSchedulingStore, request: Request<Body>) -> (StatusCode, Value) {
    let app = routes(Arc::new(store.clone()));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn slot_list(body: &Value) -> Vec<String> {
    body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s.as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_booking_flow_removes_booked_slot() {
    let store = create_store().await;

    // 1. Load the public page data
    let (status, data) = call(
        &store,
        Request::builder()
            .uri("/scheduling-data/pro-1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let service = data["services"][0].clone();
    assert_eq!(service["duration"], 60);

    // 2. Ask for the free slots of the day
    let slots_request = json!({ "userId": "pro-1", "date": "2025-06-02", "totalDuration": 60 });
    let (status, before) = call(&store, post("/available-slots", slots_request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let before = slot_list(&before);
    assert!(before.contains(&"14:00".to_string()));
    assert!(!before.contains(&"11:15".to_string()));
    assert!(before.contains(&"11:00".to_string()));
    assert!(before.contains(&"13:00".to_string()));

    // 3. Book 14:00
    let (status, booked) = call(
        &store,
        post(
            "/appointments",
            json!({
                "userId": "pro-1",
                "phone": "67999990000",
                "date": "2025-06-02",
                "startTime": "14:00",
                "name": "Ana",
                "services": [service]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booked["success"], true);
    assert!(booked["appointmentId"].as_str().is_some());

    // 4. The booked hour is gone, its neighbours remain
    let (_, after) = call(&store, post("/available-slots", slots_request)).await;
    let after = slot_list(&after);
    assert!(after.contains(&"13:00".to_string()));
    assert!(!after.contains(&"13:15".to_string()));
    assert!(!after.contains(&"14:45".to_string()));
    assert!(after.contains(&"15:00".to_string()));
    assert_eq!(before.len(), after.len() + 7);
}

#[tokio::test]
async fn test_unknown_professional_is_not_found() {
    let store = create_store().await;
    let (status, body) = call(
        &store,
        post(
            "/available-slots",
            json!({ "userId": "nobody", "date": "2025-06-02", "totalDuration": 30 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Settings not found" }));
}
