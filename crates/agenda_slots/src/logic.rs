// --- File: crates/agenda_slots/src/logic.rs ---
use agenda_common::models::{
    Appointment, Professional, SchedulingSettings, Service, ServiceLine, TimeRange,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Distance between two candidate start times.
pub const SLOT_INTERVAL_MINUTES: i64 = 15;

// --- Data Structures ---

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsRequest {
    #[cfg_attr(feature = "openapi", schema(example = "pro-1"))]
    pub user_id: Option<String>,
    /// Date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-06-02"))]
    pub date: Option<String>,
    /// Sum of the selected services' durations, in minutes
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub total_duration: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailableSlotsResponse {
    #[cfg_attr(feature = "openapi", schema(example = json!(["09:00", "09:15"])))]
    pub slots: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SchedulingDataResponse {
    pub settings: SchedulingSettings,
    pub services: Vec<Service>,
}

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub user_id: Option<String>,
    pub phone: Option<String>,
    /// Date in YYYY-MM-DD format
    pub date: Option<String>,
    pub services: Option<Vec<ServiceLine>>,
    #[cfg_attr(feature = "openapi", schema(example = "14:30"))]
    pub start_time: Option<String>,
    pub name: Option<String>,
    pub client_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub success: bool,
    pub appointment_id: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ProfessionalsResponse {
    pub professionals: Vec<Professional>,
}

/// Error body of the public booking API: `{"error": "..."}`.
#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorBody {
    pub error: String,
}

// --- Time Of Day ---

/// Minutes since midnight of an `HH:MM` (or `H:MM`) value.
///
/// Hours are not capped at 23 so that stored end times running past
/// midnight (`25:00`) still parse.
pub fn parse_time_of_day(value: &str) -> Option<i64> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return None;
    }
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Zero-padded `HH:MM`; hours keep counting past 23.
pub fn format_minutes(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Whether `value` is a calendar date written exactly as `YYYY-MM-DD`.
pub fn is_calendar_date(value: &str) -> bool {
    value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

// --- Availability Logic ---

/// A half-open `[start, end)` range of minutes since midnight that can't be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedInterval {
    pub start: i64,
    pub end: i64,
}

impl OccupiedInterval {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// `None` when either bound is missing or unparsable.
    pub fn from_times(start: &str, end: &str) -> Option<Self> {
        Some(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    /// Touching endpoints don't conflict.
    pub fn conflicts_with(&self, slot_start: i64, duration: i64) -> bool {
        slot_start.saturating_add(duration) > self.start && slot_start < self.end
    }
}

/// Occupied intervals of a day's appointments; appointments without usable
/// start and end times are skipped.
pub fn occupied_intervals(appointments: &[Appointment]) -> Vec<OccupiedInterval> {
    appointments
        .iter()
        .filter_map(|apt| {
            let interval = OccupiedInterval::from_times(&apt.start_time, &apt.end_time);
            if interval.is_none() {
                debug!(
                    "Skipping appointment {:?} without usable times ({:?}-{:?})",
                    apt.id, apt.start_time, apt.end_time
                );
            }
            interval
        })
        .collect()
}

/// Start times, earliest first, at which a service of `total_duration`
/// minutes fits the working day.
///
/// Candidates sit on a 15 minute grid from the opening time up to and
/// including the closing time, so a late slot may run past closing. The lunch
/// break is treated like any other occupied interval. Missing or unparsable
/// working hours yield no slots.
pub fn calculate_available_slots(
    working_hours: Option<&TimeRange>,
    lunch_break: Option<&TimeRange>,
    occupied: &[OccupiedInterval],
    total_duration: i64,
) -> Vec<String> {
    let Some((work_start, work_end)) = working_hours.and_then(|wh| {
        Some((parse_time_of_day(&wh.start)?, parse_time_of_day(&wh.end)?))
    }) else {
        debug!("Invalid working hours: {:?}", working_hours);
        return Vec::new();
    };

    let lunch = lunch_break.and_then(|lb| OccupiedInterval::from_times(&lb.start, &lb.end));
    let blocked: Vec<OccupiedInterval> = occupied.iter().copied().chain(lunch).collect();

    debug!(
        "Calculating slots {}-{} for {} minutes against {} occupied intervals",
        format_minutes(work_start),
        format_minutes(work_end),
        total_duration,
        blocked.len()
    );

    let mut slots = Vec::new();
    let mut candidate = work_start;
    while candidate <= work_end {
        if !blocked
            .iter()
            .any(|interval| interval.conflicts_with(candidate, total_duration))
        {
            slots.push(format_minutes(candidate));
        }
        candidate += SLOT_INTERVAL_MINUTES;
    }
    slots
}

// --- Pre-filter Gate ---

/// Outcome of the checks run before any slot is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Open,
    /// `publicSchedulingEnabled` is explicitly `false`.
    SchedulingDisabled,
    /// The date lies after `schedulingOpenUntil`.
    BeyondOpeningWindow,
    /// The date is one of the closed dates.
    ClosedDate,
}

impl GateDecision {
    pub fn is_open(self) -> bool {
        self == GateDecision::Open
    }
}

/// Checks, in order, whether `date` may be offered at all. The first failing
/// check is the reported reason.
pub fn evaluate_gate(settings: &SchedulingSettings, date: &str) -> GateDecision {
    if settings.public_scheduling_enabled == Some(false) {
        return GateDecision::SchedulingDisabled;
    }
    if let Some(cutoff) = settings.scheduling_open_until.as_deref() {
        if date > cutoff {
            return GateDecision::BeyondOpeningWindow;
        }
    }
    if settings.closed_dates.iter().any(|closed| closed == date) {
        return GateDecision::ClosedDate;
    }
    GateDecision::Open
}

// --- Booking Arithmetic ---

/// Total duration (minutes) and total price of the selected services.
pub fn booking_totals(services: &[ServiceLine]) -> (i64, f64) {
    services.iter().fold((0, 0.0), |(duration, price), service| {
        (duration.saturating_add(service.duration), price + service.price)
    })
}

/// End time of an appointment, `None` when `start_time` is unparsable or
/// the end can't be represented.
pub fn end_time(start_time: &str, total_duration: i64) -> Option<String> {
    let start = parse_time_of_day(start_time)?;
    start.checked_add(total_duration).map(format_minutes)
}
