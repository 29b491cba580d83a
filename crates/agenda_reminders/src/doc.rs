// --- File: crates/agenda_reminders/src/doc.rs ---
#![cfg(feature = "openapi")]
use crate::logic::ReminderSummary;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::remind_appointments_handler),
    components(schemas(ReminderSummary)),
    tags(
        (name = "Reminders", description = "WhatsApp appointment reminders")
    ),
    servers(
        (url = "/api", description = "Agenda API server")
    )
)]
pub struct RemindersApiDoc;
