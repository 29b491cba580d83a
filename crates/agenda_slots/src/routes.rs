// --- File: crates/agenda_slots/src/routes.rs ---

use crate::handlers::{
    available_slots_handler, create_appointment_handler, professionals_handler,
    scheduling_data_handler, SlotsState,
};
use agenda_common::SchedulingStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing the public booking routes.
pub fn routes(store: Arc<dyn SchedulingStore>) -> Router {
    let slots_state = Arc::new(SlotsState { store });

    Router::new()
        .route("/available-slots", post(available_slots_handler))
        .route("/scheduling-data/{user_id}", get(scheduling_data_handler))
        .route("/appointments", post(create_appointment_handler))
        .route("/professionals", get(professionals_handler))
        .with_state(slots_state)
}
