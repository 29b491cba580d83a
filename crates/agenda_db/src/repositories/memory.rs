//! In-memory scheduling store, used when no database is configured and in tests.

use agenda_common::models::{Appointment, Client, Professional, SchedulingSettings, Service};
use agenda_common::{not_found, AgendaError, BoxFuture, SchedulingStore};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    settings: HashMap<String, SchedulingSettings>,
    services: Vec<Service>,
    clients: Vec<Client>,
    appointments: Vec<Appointment>,
    professionals: Vec<Professional>,
    instances: HashMap<String, String>,
}

/// [`SchedulingStore`] keeping everything in process memory.
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchedulingStore {
    state: Arc<RwLock<State>>,
}

impl InMemorySchedulingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn save_settings(&self, settings: SchedulingSettings) {
        let mut state = self.state.write().await;
        state.settings.insert(settings.user_id.clone(), settings);
    }

    /// Adds a service, generating an id when it has none. Returns the id.
    pub async fn save_service(&self, mut service: Service) -> String {
        if service.id.is_empty() {
            service.id = Uuid::new_v4().to_string();
        }
        let id = service.id.clone();
        self.state.write().await.services.push(service);
        id
    }

    pub async fn save_professional(&self, professional: Professional) {
        self.state.write().await.professionals.push(professional);
    }

    pub async fn save_instance_status(&self, instance_name: &str, status: &str) {
        self.state
            .write()
            .await
            .instances
            .insert(instance_name.to_string(), status.to_string());
    }

    /// Every stored appointment, in insertion order.
    pub async fn appointments(&self) -> Vec<Appointment> {
        self.state.read().await.appointments.clone()
    }

    pub async fn clients(&self) -> Vec<Client> {
        self.state.read().await.clients.clone()
    }
}

fn sorted_by_start(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));
    appointments
}

impl SchedulingStore for InMemorySchedulingStore {
    fn find_settings<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Option<SchedulingSettings>, AgendaError> {
        Box::pin(async move { Ok(self.state.read().await.settings.get(user_id).cloned()) })
    }

    fn list_services<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Vec<Service>, AgendaError> {
        Box::pin(async move {
            let state = self.state.read().await;
            Ok(state
                .services
                .iter()
                .filter(|s| s.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    fn list_appointments_on<'a>(
        &'a self,
        user_id: &'a str,
        date: &'a str,
    ) -> BoxFuture<'a, Vec<Appointment>, AgendaError> {
        Box::pin(async move {
            let state = self.state.read().await;
            let day = state
                .appointments
                .iter()
                .filter(|a| a.user_id == user_id && a.date == date)
                .cloned()
                .collect();
            Ok(sorted_by_start(day))
        })
    }

    fn list_appointments_from<'a>(
        &'a self,
        status: &'a str,
        from_date: &'a str,
    ) -> BoxFuture<'a, Vec<Appointment>, AgendaError> {
        Box::pin(async move {
            let state = self.state.read().await;
            let upcoming = state
                .appointments
                .iter()
                .filter(|a| a.status == status && a.date.as_str() >= from_date)
                .cloned()
                .collect();
            Ok(sorted_by_start(upcoming))
        })
    }

    fn create_appointment(
        &self,
        mut appointment: Appointment,
    ) -> BoxFuture<'_, String, AgendaError> {
        Box::pin(async move {
            let id = match appointment.id.take() {
                Some(id) if !id.is_empty() => id,
                _ => Uuid::new_v4().to_string(),
            };
            appointment.id = Some(id.clone());
            appointment.created_at.get_or_insert_with(Utc::now);
            self.state.write().await.appointments.push(appointment);
            Ok(id)
        })
    }

    fn find_client<'a>(
        &'a self,
        client_id: &'a str,
    ) -> BoxFuture<'a, Option<Client>, AgendaError> {
        Box::pin(async move {
            let state = self.state.read().await;
            Ok(state
                .clients
                .iter()
                .find(|c| c.id.as_deref() == Some(client_id))
                .cloned())
        })
    }

    fn find_client_by_phone<'a>(
        &'a self,
        user_id: &'a str,
        phone: &'a str,
    ) -> BoxFuture<'a, Option<Client>, AgendaError> {
        Box::pin(async move {
            let state = self.state.read().await;
            Ok(state
                .clients
                .iter()
                .find(|c| c.user_id == user_id && c.phone == phone)
                .cloned())
        })
    }

    fn create_client(&self, mut client: Client) -> BoxFuture<'_, String, AgendaError> {
        Box::pin(async move {
            let id = match client.id.take() {
                Some(id) if !id.is_empty() => id,
                _ => Uuid::new_v4().to_string(),
            };
            client.id = Some(id.clone());
            self.state.write().await.clients.push(client);
            Ok(id)
        })
    }

    fn update_client_name<'a>(
        &'a self,
        client_id: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, (), AgendaError> {
        Box::pin(async move {
            let mut state = self.state.write().await;
            let client = state
                .clients
                .iter_mut()
                .find(|c| c.id.as_deref() == Some(client_id))
                .ok_or_else(|| not_found(format!("Client {client_id} not found")))?;
            client.name = name.to_string();
            Ok(())
        })
    }

    fn list_professionals(&self) -> BoxFuture<'_, Vec<Professional>, AgendaError> {
        Box::pin(async move { Ok(self.state.read().await.professionals.clone()) })
    }

    fn find_instance_status<'a>(
        &'a self,
        instance_name: &'a str,
    ) -> BoxFuture<'a, Option<String>, AgendaError> {
        Box::pin(async move { Ok(self.state.read().await.instances.get(instance_name).cloned()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_common::models::AppointmentClient;

    fn appointment(user_id: &str, date: &str, start: &str, status: &str) -> Appointment {
        Appointment {
            client: AppointmentClient {
                client_id: "c-1".to_string(),
                phone: "67999990000".to_string(),
                name: String::new(),
            },
            date: date.to_string(),
            start_time: start.to_string(),
            user_id: user_id.to_string(),
            status: status.to_string(),
            ..Appointment::default()
        }
    }

    #[tokio::test]
    async fn day_listing_is_scoped_and_sorted() {
        let store = InMemorySchedulingStore::new();
        store
            .create_appointment(appointment("pro-1", "2025-06-02", "14:00", "pending"))
            .await
            .unwrap();
        store
            .create_appointment(appointment("pro-1", "2025-06-02", "09:00", "scheduled"))
            .await
            .unwrap();
        store
            .create_appointment(appointment("pro-2", "2025-06-02", "10:00", "scheduled"))
            .await
            .unwrap();

        let day = store.list_appointments_on("pro-1", "2025-06-02").await.unwrap();
        let starts: Vec<_> = day.iter().map(|a| a.start_time.as_str()).collect();
        assert_eq!(starts, vec!["09:00", "14:00"]);
        assert!(day.iter().all(|a| a.id.is_some() && a.created_at.is_some()));
    }

    #[tokio::test]
    async fn upcoming_listing_filters_status_and_date() {
        let store = InMemorySchedulingStore::new();
        for (date, status) in [
            ("2025-06-01", "scheduled"),
            ("2025-06-02", "scheduled"),
            ("2025-06-02", "pending"),
            ("2025-06-03", "scheduled"),
        ] {
            store
                .create_appointment(appointment("pro-1", date, "09:00", status))
                .await
                .unwrap();
        }

        let upcoming = store
            .list_appointments_from("scheduled", "2025-06-02")
            .await
            .unwrap();
        let dates: Vec<_> = upcoming.iter().map(|a| a.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-06-02", "2025-06-03"]);
    }

    #[tokio::test]
    async fn renaming_unknown_client_is_not_found() {
        let store = InMemorySchedulingStore::new();
        let err = store.update_client_name("nope", "Ana").await.unwrap_err();
        assert!(matches!(err, AgendaError::NotFoundError(_)));
    }
}
