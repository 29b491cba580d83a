// --- File: crates/agenda_reminders/src/routes.rs ---
use crate::evolution::{EvolutionClient, EvolutionError};
use crate::handlers::{remind_appointments_handler, ReminderState};
use crate::logic::ReminderPolicy;
use agenda_common::SchedulingStore;
use agenda_config::AppConfig;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Creates a router containing the reminder routes, sending through the
/// Evolution gateway configured in `config`.
pub fn routes(
    config: &AppConfig,
    store: Arc<dyn SchedulingStore>,
) -> Result<Router, EvolutionError> {
    let evolution = config.evolution.as_ref().ok_or(EvolutionError::ConfigError)?;
    let messenger = Arc::new(EvolutionClient::new(evolution, store.clone())?);
    let policy = config
        .reminders
        .as_ref()
        .map(ReminderPolicy::from)
        .unwrap_or_default();

    Ok(router(ReminderState {
        store,
        messenger,
        policy,
    }))
}

pub fn router(state: ReminderState) -> Router {
    Router::new()
        .route("/remind-appointments", get(remind_appointments_handler))
        .with_state(Arc::new(state))
}
