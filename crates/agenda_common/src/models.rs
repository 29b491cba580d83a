// --- File: crates/agenda_common/src/models.rs ---

//! Records exchanged between the store, the handlers and the slot logic.
//!
//! Wire names are camelCase. Settings documents are read permissively: an
//! optional field with an unexpected shape is treated as absent instead of
//! failing the whole document.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Appointment created by the public booking flow, awaiting confirmation.
pub const STATUS_PENDING: &str = "pending";
/// Confirmed appointment, eligible for reminders.
pub const STATUS_SCHEDULED: &str = "scheduled";

/// A time-of-day interval as stored, both bounds `HH:MM`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[cfg_attr(feature = "openapi", schema(example = "09:00"))]
    #[serde(default)]
    pub start: String,
    #[cfg_attr(feature = "openapi", schema(example = "18:00"))]
    #[serde(default)]
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSettings {
    #[serde(default, deserialize_with = "lenient")]
    pub hours_before_reminder: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub reminder_message: Option<String>,
}

/// Per-professional scheduling configuration.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingSettings {
    #[serde(default)]
    pub user_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub working_hours: Option<TimeRange>,
    #[serde(default, deserialize_with = "lenient")]
    pub lunch_break: Option<TimeRange>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub closed_dates: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub public_scheduling_enabled: Option<bool>,
    /// Last bookable date, always a plain `YYYY-MM-DD` once deserialized.
    #[serde(
        default,
        deserialize_with = "calendar_date::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub scheduling_open_until: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    #[serde(rename = "salonUF")]
    pub salon_uf: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub reminder_settings: Option<ReminderSettings>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    /// Minutes.
    pub duration: i64,
    #[serde(default)]
    pub user_id: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub user_id: String,
}

/// Client snapshot embedded in an appointment.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentClient {
    pub client_id: String,
    pub phone: String,
    #[serde(default)]
    pub name: String,
}

/// Service snapshot embedded in an appointment.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceLine {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub duration: i64,
    #[serde(default)]
    pub price: f64,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub client: AppointmentClient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// `YYYY-MM-DD`.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date: String,
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    /// `HH:MM`; empty when the record has none.
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub total_duration: i64,
    #[serde(default)]
    pub total_price: f64,
    pub user_id: String,
    #[serde(default)]
    pub status: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Professional {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub profession: Option<String>,
}

/// Deserializes an optional field, mapping any shape mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Keeps only the string entries of an array; anything else becomes empty.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Calendar dates stored either as `YYYY-MM-DD` strings or as timestamp
/// objects (`{seconds}` or `{_seconds}`), resolved to the UTC calendar date.
pub mod calendar_date {
    use chrono::DateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Timestamp {
            #[serde(alias = "_seconds")]
            seconds: i64,
        },
    }

    fn resolve(repr: Repr) -> Option<String> {
        match repr {
            Repr::Text(s) if !s.trim().is_empty() => Some(s),
            Repr::Text(_) => None,
            Repr::Timestamp { seconds } => DateTime::from_timestamp(seconds, 0)
                .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string()),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = Repr::deserialize(deserializer)?;
        resolve(repr).ok_or_else(|| D::Error::custom("unresolvable calendar date"))
    }

    /// Unknown shapes and empty strings resolve to `None`.
    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value
            .and_then(|v| serde_json::from_value::<Repr>(v).ok())
            .and_then(resolve))
    }
}
