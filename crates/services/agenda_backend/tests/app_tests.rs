use agenda_backend::build_app;
use agenda_common::models::{SchedulingSettings, TimeRange};
use agenda_config::{AppConfig, EvolutionConfig};
use agenda_db::InMemorySchedulingStore;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn reminders_config() -> AppConfig {
    AppConfig {
        use_reminders: true,
        evolution: Some(EvolutionConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
            timeout_seconds: Some(1),
        }),
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_health() {
    let app = build_app(&AppConfig::default(), Arc::new(InMemorySchedulingStore::new()));
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_booking_api_is_nested_under_api() {
    let store = InMemorySchedulingStore::new();
    store
        .save_settings(SchedulingSettings {
            user_id: "pro-1".to_string(),
            working_hours: Some(TimeRange::new("09:00", "10:00")),
            public_scheduling_enabled: Some(true),
            ..SchedulingSettings::default()
        })
        .await;
    let app = build_app(&AppConfig::default(), Arc::new(store));

    let request = Request::builder()
        .method("POST")
        .uri("/api/available-slots")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "userId": "pro-1", "date": "2025-06-02", "totalDuration": 30 }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "slots": ["09:00", "09:15", "09:30", "09:45", "10:00"] })
    );

    let (status, _) = send(app, get("/available-slots")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reminder_route_follows_configuration() {
    let disabled = build_app(&AppConfig::default(), Arc::new(InMemorySchedulingStore::new()));
    let (status, _) = send(disabled, get("/api/remind-appointments")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let enabled = build_app(&reminders_config(), Arc::new(InMemorySchedulingStore::new()));
    let (status, body) = send(enabled, get("/api/remind-appointments")).await;
    if cfg!(feature = "reminders") {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "sent": 0 }));
    } else {
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_missing_gateway_config_keeps_booking_api_up() {
    let config = AppConfig {
        use_reminders: true,
        ..AppConfig::default()
    };
    let app = build_app(&config, Arc::new(InMemorySchedulingStore::new()));

    let (status, _) = send(app.clone(), get("/api/remind-appointments")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(app, get("/api/professionals")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "professionals": [] }));
}
