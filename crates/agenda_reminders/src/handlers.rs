// --- File: crates/agenda_reminders/src/handlers.rs ---
use crate::logic::{run_reminder_pass, ReminderPolicy, ReminderSummary};
use agenda_common::{AgendaError, MessagingService, SchedulingStore};
use axum::{extract::State, response::Json};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

// Define shared state needed by the reminder handler
#[derive(Clone)]
pub struct ReminderState {
    pub store: Arc<dyn SchedulingStore>,
    pub messenger: Arc<dyn MessagingService>,
    pub policy: ReminderPolicy,
}

/// Handler running one reminder pass. Meant to be called every few minutes
/// by an external scheduler.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/remind-appointments",
    responses(
        (status = 200, description = "Number of reminders sent", body = ReminderSummary),
        (status = 500, description = "Appointments could not be listed")
    ),
    tag = "Reminders"
))]
pub async fn remind_appointments_handler(
    State(state): State<Arc<ReminderState>>,
) -> Result<Json<ReminderSummary>, AgendaError> {
    info!("Running reminder pass");
    let summary = run_reminder_pass(
        state.store.as_ref(),
        state.messenger.as_ref(),
        &state.policy,
        Utc::now(),
    )
    .await?;
    Ok(Json(summary))
}
