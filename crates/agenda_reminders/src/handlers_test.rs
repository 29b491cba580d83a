#[cfg(test)]
mod tests {
    use crate::handlers::ReminderState;
    use crate::logic::ReminderPolicy;
    use crate::routes::{router, routes};
    use agenda_common::models::{Appointment, AppointmentClient, STATUS_SCHEDULED};
    use agenda_common::{
        external_service_error, AgendaError, BoxFuture, MessageReceipt, MessagingService,
        SchedulingStore,
    };
    use agenda_config::{AppConfig, EvolutionConfig};
    use agenda_db::InMemorySchedulingStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    #[derive(Default)]
    struct CountingMessenger {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MessagingService for CountingMessenger {
        fn send_text<'a>(
            &'a self,
            _instance: &'a str,
            _phone: &'a str,
            _text: &'a str,
        ) -> BoxFuture<'a, MessageReceipt, AgendaError> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.fail {
                    Err(external_service_error("evolution", "instance closed"))
                } else {
                    Ok(MessageReceipt::default())
                }
            })
        }
    }

    fn remind_request() -> Request<Body> {
        Request::builder()
            .uri("/remind-appointments")
            .body(Body::empty())
            .unwrap()
    }

    async fn call(state: ReminderState) -> (StatusCode, Value) {
        let response = router(state).oneshot(remind_request()).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_remind_with_no_appointments() {
        let messenger = Arc::new(CountingMessenger::default());
        let (status, body) = call(ReminderState {
            store: Arc::new(InMemorySchedulingStore::new()),
            messenger: messenger.clone(),
            policy: ReminderPolicy::default(),
        })
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "sent": 0 }));
        assert_eq!(messenger.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_future_appointments_are_not_reminded() {
        // Appointments far in the future are listed but never due
        let store = InMemorySchedulingStore::new();
        store
            .create_appointment(Appointment {
                client: AppointmentClient {
                    client_id: "c-1".to_string(),
                    phone: "67999990000".to_string(),
                    name: String::new(),
                },
                date: "2999-01-01".to_string(),
                start_time: "10:00".to_string(),
                user_id: "pro-1".to_string(),
                status: STATUS_SCHEDULED.to_string(),
                ..Appointment::default()
            })
            .await
            .unwrap();

        let messenger = Arc::new(CountingMessenger {
            fail: true,
            ..CountingMessenger::default()
        });
        let (status, body) = call(ReminderState {
            store: Arc::new(store),
            messenger: messenger.clone(),
            policy: ReminderPolicy::default(),
        })
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sent"], 0);
        assert_eq!(messenger.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_routes_require_evolution_config() {
        let store: Arc<dyn SchedulingStore> = Arc::new(InMemorySchedulingStore::new());
        let config = AppConfig::default();
        assert!(routes(&config, store.clone()).is_err());

        let config = AppConfig {
            evolution: Some(EvolutionConfig {
                base_url: "http://localhost:8080".to_string(),
                api_key: "key".to_string(),
                timeout_seconds: None,
            }),
            ..AppConfig::default()
        };
        assert!(routes(&config, store).is_ok());
    }
}
