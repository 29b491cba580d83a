//! SQL implementation of the scheduling store
//!
//! Settings are kept as JSON documents keyed by the professional's user id so
//! that optional and polymorphic fields go through the same permissive
//! deserialization as any other source. Everything else is relational.

use crate::error::DbError;
use crate::DbClient;
use agenda_common::models::{
    Appointment, AppointmentClient, Client, Professional, SchedulingSettings, Service, ServiceLine,
};
use agenda_common::{AgendaError, BoxFuture, SchedulingStore};
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS settings (
        user_id TEXT PRIMARY KEY,
        document TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS services (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        price REAL NOT NULL DEFAULT 0,
        duration INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        phone TEXT NOT NULL,
        name TEXT NOT NULL DEFAULT '',
        notes TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        client_id TEXT NOT NULL,
        client_phone TEXT NOT NULL,
        client_name TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL,
        start_time TEXT NOT NULL DEFAULT '',
        end_time TEXT NOT NULL DEFAULT '',
        services TEXT NOT NULL DEFAULT '[]',
        total_duration INTEGER NOT NULL DEFAULT 0,
        total_price REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT '',
        created_at TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_appointments_user_date ON appointments (user_id, date)",
    r#"
    CREATE TABLE IF NOT EXISTS professionals (
        id TEXT PRIMARY KEY,
        name TEXT,
        email TEXT,
        profession TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS whatsapp_instances (
        instance_name TEXT PRIMARY KEY,
        status TEXT NOT NULL
    )
    "#,
];

const APPOINTMENT_COLUMNS: &str = "id, user_id, client_id, client_phone, client_name, date, \
     start_time, end_time, services, total_duration, total_price, status, created_at";

/// SQL implementation of [`SchedulingStore`]
#[derive(Debug, Clone)]
pub struct SqlSchedulingStore {
    db_client: DbClient,
}

impl SqlSchedulingStore {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Creates the tables if they don't exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing scheduling schema");
        for statement in SCHEMA {
            self.db_client.execute(statement).await?;
        }
        info!("Scheduling schema initialized successfully");
        Ok(())
    }

    /// Inserts or replaces the settings document of `settings.user_id`.
    pub async fn save_settings(&self, settings: &SchedulingSettings) -> Result<(), DbError> {
        let document = serde_json::to_string(settings)?;
        sqlx::query(
            "INSERT INTO settings (user_id, document) VALUES (?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET document = excluded.document",
        )
        .bind(settings.user_id.clone())
        .bind(document)
        .execute(self.db_client.pool())
        .await
        .map_err(query_error("save settings"))?;
        Ok(())
    }

    /// Inserts a service, generating an id when it has none. Returns the id.
    pub async fn save_service(&self, service: &Service) -> Result<String, DbError> {
        let id = non_empty_or_new(&service.id);
        sqlx::query(
            "INSERT INTO services (id, user_id, name, price, duration) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.clone())
        .bind(service.user_id.clone())
        .bind(service.name.clone())
        .bind(service.price)
        .bind(service.duration)
        .execute(self.db_client.pool())
        .await
        .map_err(query_error("save service"))?;
        Ok(id)
    }

    pub async fn save_professional(&self, professional: &Professional) -> Result<(), DbError> {
        sqlx::query("INSERT INTO professionals (id, name, email, profession) VALUES (?, ?, ?, ?)")
            .bind(professional.id.clone())
            .bind(professional.name.clone())
            .bind(professional.email.clone())
            .bind(professional.profession.clone())
            .execute(self.db_client.pool())
            .await
            .map_err(query_error("save professional"))?;
        Ok(())
    }

    pub async fn save_instance_status(
        &self,
        instance_name: &str,
        status: &str,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO whatsapp_instances (instance_name, status) VALUES (?, ?) \
             ON CONFLICT(instance_name) DO UPDATE SET status = excluded.status",
        )
        .bind(instance_name.to_string())
        .bind(status.to_string())
        .execute(self.db_client.pool())
        .await
        .map_err(query_error("save instance status"))?;
        Ok(())
    }

    async fn fetch_settings(&self, user_id: &str) -> Result<Option<SchedulingSettings>, DbError> {
        let row = sqlx::query("SELECT user_id, document FROM settings WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error("find settings"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let document: String = row.try_get("document")?;
        let mut settings: SchedulingSettings = serde_json::from_str(&document)?;
        if settings.user_id.is_empty() {
            settings.user_id = row.try_get("user_id")?;
        }
        Ok(Some(settings))
    }

    async fn fetch_services(&self, user_id: &str) -> Result<Vec<Service>, DbError> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, price, duration FROM services WHERE user_id = ? ORDER BY name",
        )
        .bind(user_id.to_string())
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_error("list services"))?;

        rows.iter()
            .map(|row| -> Result<Service, DbError> {
                Ok(Service {
                    id: row.try_get("id")?,
                    user_id: row.try_get("user_id")?,
                    name: row.try_get("name")?,
                    price: row.try_get("price")?,
                    duration: row.try_get("duration")?,
                })
            })
            .collect()
    }

    async fn fetch_appointments(
        &self,
        filter_sql: &str,
        first: &str,
        second: &str,
    ) -> Result<Vec<Appointment>, DbError> {
        let query = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE {filter_sql} \
             ORDER BY date, start_time"
        );
        let rows = sqlx::query(&query)
            .bind(first.to_string())
            .bind(second.to_string())
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error("list appointments"))?;

        rows.iter().map(appointment_from_row).collect()
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<String, DbError> {
        let id = appointment
            .id
            .as_deref()
            .map(non_empty_or_new)
            .unwrap_or_else(new_id);
        let services = serde_json::to_string(&appointment.services)?;
        let created_at = appointment.created_at.unwrap_or_else(Utc::now).to_rfc3339();

        let query = format!(
            "INSERT INTO appointments ({APPOINTMENT_COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&query)
            .bind(id.clone())
            .bind(appointment.user_id)
            .bind(appointment.client.client_id)
            .bind(appointment.client.phone)
            .bind(appointment.client.name)
            .bind(appointment.date)
            .bind(appointment.start_time)
            .bind(appointment.end_time)
            .bind(services)
            .bind(appointment.total_duration)
            .bind(appointment.total_price)
            .bind(appointment.status)
            .bind(created_at)
            .execute(self.db_client.pool())
            .await
            .map_err(query_error("create appointment"))?;

        info!("Appointment {} stored", id);
        Ok(id)
    }

    async fn fetch_client(
        &self,
        filter_sql: &str,
        binds: &[&str],
    ) -> Result<Option<Client>, DbError> {
        let query =
            format!("SELECT id, user_id, phone, name, notes FROM clients WHERE {filter_sql} LIMIT 1");
        let mut statement = sqlx::query(&query);
        for value in binds {
            statement = statement.bind(value.to_string());
        }
        let row = statement
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error("find client"))?;

        row.map(|row| -> Result<Client, DbError> {
            Ok(Client {
                id: Some(row.try_get("id")?),
                user_id: row.try_get("user_id")?,
                phone: row.try_get("phone")?,
                name: row.try_get("name")?,
                notes: row.try_get("notes")?,
            })
        })
        .transpose()
    }

    async fn insert_client(&self, client: Client) -> Result<String, DbError> {
        let id = client
            .id
            .as_deref()
            .map(non_empty_or_new)
            .unwrap_or_else(new_id);
        sqlx::query("INSERT INTO clients (id, user_id, phone, name, notes) VALUES (?, ?, ?, ?, ?)")
            .bind(id.clone())
            .bind(client.user_id)
            .bind(client.phone)
            .bind(client.name)
            .bind(client.notes)
            .execute(self.db_client.pool())
            .await
            .map_err(query_error("create client"))?;
        Ok(id)
    }

    async fn set_client_name(&self, client_id: &str, name: &str) -> Result<(), DbError> {
        sqlx::query("UPDATE clients SET name = ? WHERE id = ?")
            .bind(name.to_string())
            .bind(client_id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(query_error("update client name"))?;
        Ok(())
    }

    async fn fetch_professionals(&self) -> Result<Vec<Professional>, DbError> {
        let rows = sqlx::query("SELECT id, name, email, profession FROM professionals ORDER BY id")
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error("list professionals"))?;

        rows.iter()
            .map(|row| -> Result<Professional, DbError> {
                Ok(Professional {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    profession: row.try_get("profession")?,
                })
            })
            .collect()
    }

    async fn fetch_instance_status(&self, instance_name: &str) -> Result<Option<String>, DbError> {
        let row = sqlx::query("SELECT status FROM whatsapp_instances WHERE instance_name = ?")
            .bind(instance_name.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error("find instance status"))?;
        row.map(|row| row.try_get("status").map_err(DbError::from))
            .transpose()
    }
}

impl SchedulingStore for SqlSchedulingStore {
    fn find_settings<'a>(
        &'a self,
        user_id: &'a str,
    ) -> BoxFuture<'a, Option<SchedulingSettings>, AgendaError> {
        Box::pin(async move {
            self.fetch_settings(user_id)
                .await
                .map_err(AgendaError::from)
        })
    }

    fn list_services<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Vec<Service>, AgendaError> {
        Box::pin(async move {
            self.fetch_services(user_id)
                .await
                .map_err(AgendaError::from)
        })
    }

    fn list_appointments_on<'a>(
        &'a self,
        user_id: &'a str,
        date: &'a str,
    ) -> BoxFuture<'a, Vec<Appointment>, AgendaError> {
        Box::pin(async move {
            self.fetch_appointments("user_id = ? AND date = ?", user_id, date)
                .await
                .map_err(AgendaError::from)
        })
    }

    fn list_appointments_from<'a>(
        &'a self,
        status: &'a str,
        from_date: &'a str,
    ) -> BoxFuture<'a, Vec<Appointment>, AgendaError> {
        Box::pin(async move {
            self.fetch_appointments("status = ? AND date >= ?", status, from_date)
                .await
                .map_err(AgendaError::from)
        })
    }

    fn create_appointment(&self, appointment: Appointment) -> BoxFuture<'_, String, AgendaError> {
        Box::pin(async move {
            self.insert_appointment(appointment)
                .await
                .map_err(AgendaError::from)
        })
    }

    fn find_client<'a>(
        &'a self,
        client_id: &'a str,
    ) -> BoxFuture<'a, Option<Client>, AgendaError> {
        Box::pin(async move {
            self.fetch_client("id = ?", &[client_id])
                .await
                .map_err(AgendaError::from)
        })
    }

    fn find_client_by_phone<'a>(
        &'a self,
        user_id: &'a str,
        phone: &'a str,
    ) -> BoxFuture<'a, Option<Client>, AgendaError> {
        Box::pin(async move {
            self.fetch_client("phone = ? AND user_id = ?", &[phone, user_id])
                .await
                .map_err(AgendaError::from)
        })
    }

    fn create_client(&self, client: Client) -> BoxFuture<'_, String, AgendaError> {
        Box::pin(async move {
            self.insert_client(client)
                .await
                .map_err(AgendaError::from)
        })
    }

    fn update_client_name<'a>(
        &'a self,
        client_id: &'a str,
        name: &'a str,
    ) -> BoxFuture<'a, (), AgendaError> {
        Box::pin(async move {
            self.set_client_name(client_id, name)
                .await
                .map_err(AgendaError::from)
        })
    }

    fn list_professionals(&self) -> BoxFuture<'_, Vec<Professional>, AgendaError> {
        Box::pin(async move {
            self.fetch_professionals()
                .await
                .map_err(AgendaError::from)
        })
    }

    fn find_instance_status<'a>(
        &'a self,
        instance_name: &'a str,
    ) -> BoxFuture<'a, Option<String>, AgendaError> {
        Box::pin(async move {
            self.fetch_instance_status(instance_name)
                .await
                .map_err(AgendaError::from)
        })
    }
}

fn appointment_from_row(row: &AnyRow) -> Result<Appointment, DbError> {
    let services: String = row.try_get("services")?;
    let services: Vec<ServiceLine> = serde_json::from_str(&services)?;
    let created_at: Option<String> = row.try_get("created_at")?;
    let created_at = created_at
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Appointment {
        id: Some(row.try_get("id")?),
        client: AppointmentClient {
            client_id: row.try_get("client_id")?,
            phone: row.try_get("client_phone")?,
            name: row.try_get("client_name")?,
        },
        created_at,
        date: row.try_get("date")?,
        services,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        total_duration: row.try_get("total_duration")?,
        total_price: row.try_get("total_price")?,
        user_id: row.try_get("user_id")?,
        status: row.try_get("status")?,
    })
}

fn query_error(action: &'static str) -> impl Fn(sqlx::Error) -> DbError {
    move |e| {
        error!("Failed to {}: {}", action, e);
        DbError::QueryError(format!("{action}: {e}"))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn non_empty_or_new(id: &str) -> String {
    if id.is_empty() {
        new_id()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_common::models::{TimeRange, STATUS_PENDING, STATUS_SCHEDULED};

    async fn store() -> SqlSchedulingStore {
        let client = DbClient::from_url("sqlite::memory:").await.unwrap();
        let store = SqlSchedulingStore::new(client);
        store.init_schema().await.unwrap();
        store
    }

    fn appointment(date: &str, start: &str, end: &str, status: &str) -> Appointment {
        Appointment {
            id: None,
            client: AppointmentClient {
                client_id: "client-1".to_string(),
                phone: "67999990000".to_string(),
                name: "Ana".to_string(),
            },
            created_at: None,
            date: date.to_string(),
            services: vec![ServiceLine {
                id: "svc-1".to_string(),
                name: "Corte".to_string(),
                duration: 60,
                price: 50.0,
            }],
            start_time: start.to_string(),
            end_time: end.to_string(),
            total_duration: 60,
            total_price: 50.0,
            user_id: "pro-1".to_string(),
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn settings_round_trip_through_document_column() {
        let store = store().await;
        let settings = SchedulingSettings {
            user_id: "pro-1".to_string(),
            working_hours: Some(TimeRange::new("09:00", "18:00")),
            lunch_break: Some(TimeRange::new("12:00", "13:00")),
            closed_dates: vec!["2025-12-25".to_string()],
            public_scheduling_enabled: Some(true),
            scheduling_open_until: Some("2025-12-31".to_string()),
            ..SchedulingSettings::default()
        };
        store.save_settings(&settings).await.unwrap();

        let found = store.find_settings("pro-1").await.unwrap();
        assert_eq!(found, Some(settings));
        assert_eq!(store.find_settings("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn appointments_are_filtered_by_day_and_status() {
        let store = store().await;
        store
            .create_appointment(appointment("2025-06-02", "11:00", "12:00", STATUS_PENDING))
            .await
            .unwrap();
        store
            .create_appointment(appointment("2025-06-02", "09:00", "10:00", STATUS_SCHEDULED))
            .await
            .unwrap();
        store
            .create_appointment(appointment("2025-06-03", "09:00", "10:00", STATUS_SCHEDULED))
            .await
            .unwrap();

        let day = store.list_appointments_on("pro-1", "2025-06-02").await.unwrap();
        let starts: Vec<_> = day.iter().map(|a| a.start_time.as_str()).collect();
        assert_eq!(starts, vec!["09:00", "11:00"]);
        assert_eq!(day[0].services[0].name, "Corte");
        assert!(day[0].created_at.is_some());

        let upcoming = store
            .list_appointments_from(STATUS_SCHEDULED, "2025-06-03")
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].date, "2025-06-03");
    }

    #[tokio::test]
    async fn clients_are_found_by_phone_within_professional() {
        let store = store().await;
        let id = store
            .create_client(Client {
                id: None,
                name: String::new(),
                phone: "67999990000".to_string(),
                notes: String::new(),
                user_id: "pro-1".to_string(),
            })
            .await
            .unwrap();

        assert!(store
            .find_client_by_phone("pro-2", "67999990000")
            .await
            .unwrap()
            .is_none());

        store.update_client_name(&id, "Ana").await.unwrap();
        let client = store
            .find_client_by_phone("pro-1", "67999990000")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(client.id.as_deref(), Some(id.as_str()));
        assert_eq!(client.name, "Ana");
        assert_eq!(store.find_client(&id).await.unwrap(), Some(client));
    }

    #[tokio::test]
    async fn services_professionals_and_instances() {
        let store = store().await;
        store
            .save_service(&Service {
                id: String::new(),
                name: "Escova".to_string(),
                price: 40.0,
                duration: 45,
                user_id: "pro-1".to_string(),
            })
            .await
            .unwrap();
        store
            .save_professional(&Professional {
                id: "pro-1".to_string(),
                name: Some("Salão Bela".to_string()),
                email: None,
                profession: Some("cabeleireira".to_string()),
            })
            .await
            .unwrap();
        store.save_instance_status("pro-1", "open").await.unwrap();
        store.save_instance_status("pro-1", "CONNECTED").await.unwrap();

        let services = store.list_services("pro-1").await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].duration, 45);
        assert!(!services[0].id.is_empty());

        let professionals = store.list_professionals().await.unwrap();
        assert_eq!(professionals[0].email, None);

        assert_eq!(
            store.find_instance_status("pro-1").await.unwrap().as_deref(),
            Some("CONNECTED")
        );
        assert_eq!(store.find_instance_status("pro-2").await.unwrap(), None);
    }
}
