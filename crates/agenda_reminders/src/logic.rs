// --- File: crates/agenda_reminders/src/logic.rs ---
use agenda_common::models::{Appointment, SchedulingSettings, STATUS_SCHEDULED};
use agenda_common::{AgendaError, MessagingService, SchedulingStore};
use agenda_config::{ReminderConfig, DEFAULT_REMINDER_WINDOW_MINUTES, DEFAULT_UF};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, error, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Placeholder in the reminder template replaced by the appointment start time.
pub const START_TIME_PLACEHOLDER: &str = "{horario}";

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReminderSummary {
    /// Reminders the gateway accepted.
    pub sent: usize,
}

/// Which salons get reminders and when they are due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPolicy {
    pub window_minutes: i64,
    /// Only salons in this UF are reminded; `None` reminds every salon.
    pub allowed_uf: Option<String>,
    /// UF assumed for salons that don't declare one.
    pub default_uf: String,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_REMINDER_WINDOW_MINUTES,
            allowed_uf: Some(DEFAULT_UF.to_string()),
            default_uf: DEFAULT_UF.to_string(),
        }
    }
}

impl From<&ReminderConfig> for ReminderPolicy {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            window_minutes: config.window_minutes(),
            allowed_uf: config
                .allowed_uf
                .as_deref()
                .map(str::trim)
                .filter(|uf| !uf.is_empty())
                .map(str::to_string),
            default_uf: config.default_uf().to_string(),
        }
    }
}

/// Time zone of a Brazilian state. States on Brasília time share
/// `America/Sao_Paulo`, which is also the fallback for unknown codes.
pub fn uf_time_zone(uf: &str) -> Tz {
    match uf.trim().to_ascii_uppercase().as_str() {
        "AC" => chrono_tz::America::Rio_Branco,
        "AM" => chrono_tz::America::Manaus,
        "RO" => chrono_tz::America::Porto_Velho,
        "RR" => chrono_tz::America::Boa_Vista,
        "MT" => chrono_tz::America::Cuiaba,
        "MS" => chrono_tz::America::Campo_Grande,
        "PA" | "AP" => chrono_tz::America::Belem,
        _ => chrono_tz::America::Sao_Paulo,
    }
}

/// Start of an appointment as a UTC instant, reading `date` and `start_time`
/// as wall-clock time in `tz`.
pub fn appointment_instant(date: &str, start_time: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = NaiveTime::parse_from_str(start_time.trim(), "%H:%M").ok()?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Due iff `reminder_at <= now < reminder_at + window`. A lead or window
/// outside chrono's range is never due.
pub fn is_reminder_due(
    appointment_at: DateTime<Utc>,
    hours_before: f64,
    now: DateTime<Utc>,
    window_minutes: i64,
) -> bool {
    let lead_ms = (hours_before * 3_600_000.0).round();
    let bounds = (lead_ms.is_finite() && lead_ms.abs() < i64::MAX as f64)
        .then(|| Duration::try_milliseconds(lead_ms as i64))
        .flatten()
        .and_then(|lead| appointment_at.checked_sub_signed(lead))
        .and_then(|reminder_at| {
            let window = Duration::try_minutes(window_minutes)?;
            Some((reminder_at, reminder_at.checked_add_signed(window)?))
        });
    let Some((reminder_at, window_end)) = bounds else {
        warn!(
            "Reminder {} hours before {} is out of range",
            hours_before, appointment_at
        );
        return false;
    };
    reminder_at <= now && now < window_end
}

/// Fills the first `{horario}` of the template with the start time.
pub fn render_reminder(template: &str, start_time: &str) -> String {
    template.replacen(START_TIME_PLACEHOLDER, start_time, 1)
}

/// Reminder text for `appointment` if one is due at `now`, `None` otherwise.
pub fn due_reminder(
    appointment: &Appointment,
    settings: &SchedulingSettings,
    policy: &ReminderPolicy,
    now: DateTime<Utc>,
) -> Option<String> {
    let reminder = settings.reminder_settings.as_ref()?;
    let hours_before = reminder.hours_before_reminder.filter(|h| *h > 0.0)?;
    let template = reminder
        .reminder_message
        .as_deref()
        .filter(|m| !m.is_empty())?;

    let salon_uf = settings
        .salon_uf
        .as_deref()
        .map(str::trim)
        .filter(|uf| !uf.is_empty());
    if let (Some(allowed), Some(uf)) = (policy.allowed_uf.as_deref(), salon_uf) {
        if !uf.eq_ignore_ascii_case(allowed) {
            debug!(
                "Skipping reminders of user={} in UF {}",
                appointment.user_id, uf
            );
            return None;
        }
    }

    let tz = uf_time_zone(salon_uf.unwrap_or(&policy.default_uf));
    let Some(appointment_at) = appointment_instant(&appointment.date, &appointment.start_time, tz)
    else {
        warn!(
            "Appointment {:?} has an unusable date/time: {} {}",
            appointment.id, appointment.date, appointment.start_time
        );
        return None;
    };

    is_reminder_due(appointment_at, hours_before, now, policy.window_minutes)
        .then(|| render_reminder(template, &appointment.start_time))
}

/// Sends every reminder due at `now`.
///
/// Looks at scheduled appointments from today (UTC) on. Settings of all
/// owners are loaded concurrently. A failed send is logged and the pass
/// carries on; only a failed appointment listing aborts it.
pub async fn run_reminder_pass(
    store: &dyn SchedulingStore,
    messenger: &dyn MessagingService,
    policy: &ReminderPolicy,
    now: DateTime<Utc>,
) -> Result<ReminderSummary, AgendaError> {
    let today = now.date_naive().format("%Y-%m-%d").to_string();
    let appointments = store.list_appointments_from(STATUS_SCHEDULED, &today).await?;
    if appointments.is_empty() {
        return Ok(ReminderSummary::default());
    }

    let owners: BTreeSet<&str> = appointments.iter().map(|a| a.user_id.as_str()).collect();
    let loaded = join_all(owners.iter().map(|user_id| async move {
        (*user_id, store.find_settings(user_id).await)
    }))
    .await;

    let mut settings_by_owner: HashMap<&str, SchedulingSettings> = HashMap::new();
    for (user_id, result) in loaded {
        match result {
            Ok(Some(settings)) => {
                settings_by_owner.insert(user_id, settings);
            }
            Ok(None) => {}
            Err(e) => error!("Failed to load settings of user={}: {}", user_id, e),
        }
    }

    let mut summary = ReminderSummary::default();
    for appointment in &appointments {
        let Some(settings) = settings_by_owner.get(appointment.user_id.as_str()) else {
            continue;
        };
        let Some(message) = due_reminder(appointment, settings, policy, now) else {
            continue;
        };

        let client = match store.find_client(&appointment.client.client_id).await {
            Ok(Some(client)) => client,
            Ok(None) => {
                debug!(
                    "Client {} of appointment {:?} not found",
                    appointment.client.client_id, appointment.id
                );
                continue;
            }
            Err(e) => {
                error!(
                    "Failed to load client {}: {}",
                    appointment.client.client_id, e
                );
                continue;
            }
        };

        match messenger
            .send_text(&appointment.user_id, &client.phone, &message)
            .await
        {
            Ok(receipt) => {
                summary.sent += 1;
                info!(
                    "Reminder for appointment {:?} sent ({:?}, {})",
                    appointment.id, receipt.id, receipt.status
                );
            }
            Err(e) => error!(
                "Failed to send reminder for appointment {:?}: {}",
                appointment.id, e
            ),
        }
    }

    info!("Reminder pass finished: {} sent", summary.sent);
    Ok(summary)
}
