// --- File: crates/agenda_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The handlers only ever see these traits; the concrete store and gateway are
//! chosen at startup and handed in through axum state.

use crate::error::AgendaError;
use crate::models::{Appointment, Client, Professional, SchedulingSettings, Service};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Persistence operations the booking flow needs.
pub trait SchedulingStore: Send + Sync {
    /// Settings of a professional, `None` when the professional has none.
    fn find_settings<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Option<SchedulingSettings>, AgendaError>;

    /// Services offered by a professional.
    fn list_services<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Vec<Service>, AgendaError>;

    /// Appointments of a professional on one `YYYY-MM-DD` date, any status.
    fn list_appointments_on<'a>(
        &'a self,
        user_id: &'a str,
        date: &'a str,
    ) -> BoxFuture<'a, Vec<Appointment>, AgendaError>;

    /// Appointments of every professional with `status` on or after `from_date`.
    fn list_appointments_from<'a>(
        &'a self,
        status: &'a str,
        from_date: &'a str,
    ) -> BoxFuture<'a, Vec<Appointment>, AgendaError>;

    /// Stores a new appointment and returns its id.
    fn create_appointment(&self, appointment: Appointment) -> BoxFuture<'_, String, AgendaError>;

    fn find_client<'a>(&'a self, client_id: &'a str)
        -> BoxFuture<'a, Option<Client>, AgendaError>;

    fn find_client_by_phone<'a>(
        &'a self,
        user_id: &'a str,
        phone: &'a str,
    ) -> BoxFuture<'a, Option<Client>, AgendaError>;

    /// Stores a new client and returns its id.
    fn create_client(&self, client: Client) -> BoxFuture<'_, String, AgendaError>;

    fn update_client_name<'a>(
        &'a self,
        client_id: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, (), AgendaError>;

    fn list_professionals(&self) -> BoxFuture<'_, Vec<Professional>, AgendaError>;

    /// Last known state of a WhatsApp gateway instance (e.g. `OPEN`).
    fn find_instance_status<'a>(
        &'a self,
        instance_name: &'a str,
    ) -> BoxFuture<'a, Option<String>, AgendaError>;
}

/// Outbound text messaging (WhatsApp).
pub trait MessagingService: Send + Sync {
    /// Sends `text` to `phone` through the gateway instance `instance`.
    fn send_text<'a>(
        &'a self,
        instance: &'a str,
        phone: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, MessageReceipt, AgendaError>;
}

/// What the gateway acknowledged for a sent message.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageReceipt {
    /// Gateway message id, when it returned one.
    pub id: Option<String>,
    /// Raw status reported by the gateway.
    pub status: String,
}
