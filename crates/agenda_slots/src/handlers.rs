// File: crates/agenda_slots/src/handlers.rs
use crate::logic::{
    booking_totals, calculate_available_slots, end_time, evaluate_gate, is_calendar_date,
    occupied_intervals, parse_time_of_day, AvailableSlotsRequest, AvailableSlotsResponse,
    BookingResponse, CreateAppointmentRequest, ErrorBody, ProfessionalsResponse,
    SchedulingDataResponse,
};
use agenda_common::models::{Appointment, AppointmentClient, Client, STATUS_PENDING};
use agenda_common::{AgendaError, SchedulingStore};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

const MISSING_SLOT_FIELDS: &str = "Missing required fields: userId, date, totalDuration";
const MISSING_BOOKING_FIELDS: &str = "Missing required fields: userId, phone, date, services";

// Define shared state needed by the booking handlers
#[derive(Clone)]
pub struct SlotsState {
    pub store: Arc<dyn SchedulingStore>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Trimmed, non-empty value of an optional request field.
fn required(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Handler to compute the free start times of a professional on one date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/available-slots",
    request_body = AvailableSlotsRequest,
    responses(
        (status = 200, description = "Free start times, earliest first", body = AvailableSlotsResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "Settings not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    tag = "Booking"
))]
pub async fn available_slots_handler(
    State(state): State<Arc<SlotsState>>,
    payload: Result<Json<AvailableSlotsRequest>, JsonRejection>,
) -> Result<Json<AvailableSlotsResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        info!("Rejected available-slots body: {}", rejection);
        api_error(StatusCode::BAD_REQUEST, MISSING_SLOT_FIELDS)
    })?;

    let (Some(user_id), Some(date), Some(total_duration)) = (
        required(request.user_id.as_ref()),
        required(request.date.as_ref()),
        request.total_duration.filter(|d| *d != 0),
    ) else {
        return Err(api_error(StatusCode::BAD_REQUEST, MISSING_SLOT_FIELDS));
    };
    if total_duration < 0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "totalDuration must be positive",
        ));
    }
    if !is_calendar_date(date) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid date format (YYYY-MM-DD)",
        ));
    }
    info!(
        "Slot lookup for user={} date={} duration={}",
        user_id, date, total_duration
    );

    let store_failure = |e: AgendaError| {
        error!("Error calculating available slots: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error calculating available slots",
        )
    };

    let settings = state
        .store
        .find_settings(user_id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Settings not found"))?;

    let gate = evaluate_gate(&settings, date);
    if !gate.is_open() {
        info!("No slots for user={} date={}: {:?}", user_id, date, gate);
        return Ok(Json(AvailableSlotsResponse { slots: Vec::new() }));
    }

    let appointments = state
        .store
        .list_appointments_on(user_id, date)
        .await
        .map_err(store_failure)?;

    let slots = calculate_available_slots(
        settings.working_hours.as_ref(),
        settings.lunch_break.as_ref(),
        &occupied_intervals(&appointments),
        total_duration,
    );
    info!(
        "Generated {} slots for user={} date={} ({} appointments)",
        slots.len(),
        user_id,
        date,
        appointments.len()
    );
    Ok(Json(AvailableSlotsResponse { slots }))
}

/// Handler returning the public booking page data of a professional.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/scheduling-data/{user_id}",
    params(("user_id" = String, Path, description = "Professional's user id")),
    responses(
        (status = 200, description = "Settings and services", body = SchedulingDataResponse),
        (status = 403, description = "Public scheduling disabled", body = ErrorBody),
        (status = 404, description = "Settings not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    tag = "Booking"
))]
pub async fn scheduling_data_handler(
    State(state): State<Arc<SlotsState>>,
    Path(user_id): Path<String>,
) -> Result<Json<SchedulingDataResponse>, ApiError> {
    let store_failure = |e: AgendaError| {
        error!("Error fetching scheduling data: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Erro ao buscar dados de agendamento",
        )
    };

    let settings = state
        .store
        .find_settings(&user_id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| {
            info!("No settings for user={}", user_id);
            api_error(
                StatusCode::NOT_FOUND,
                "Configurações não encontradas para este profissional",
            )
        })?;

    if settings.public_scheduling_enabled != Some(true) {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "Agendamento público não está habilitado",
        ));
    }

    let services = state
        .store
        .list_services(&user_id)
        .await
        .map_err(store_failure)?;

    Ok(Json(SchedulingDataResponse { settings, services }))
}

/// Handler creating a pending appointment from the public booking page.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment created", body = BookingResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 500, description = "Booking failed", body = ErrorBody)
    ),
    tag = "Booking"
))]
pub async fn create_appointment_handler(
    State(state): State<Arc<SlotsState>>,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<Json<BookingResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        info!("Rejected appointment body: {}", rejection);
        api_error(StatusCode::BAD_REQUEST, MISSING_BOOKING_FIELDS)
    })?;

    let services = request.services.unwrap_or_default();
    let (Some(user_id), Some(phone), Some(date)) = (
        required(request.user_id.as_ref()),
        required(request.phone.as_ref()),
        required(request.date.as_ref()),
    ) else {
        return Err(api_error(StatusCode::BAD_REQUEST, MISSING_BOOKING_FIELDS));
    };
    if services.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, MISSING_BOOKING_FIELDS));
    }

    let start_time = request.start_time.as_deref().unwrap_or_default().trim();
    if parse_time_of_day(start_time).is_none() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid startTime format (HH:MM)",
        ));
    }
    let (total_duration, total_price) = booking_totals(&services);
    let end = end_time(start_time, total_duration).ok_or_else(|| {
        info!("Rejected booking lasting {} minutes", total_duration);
        api_error(StatusCode::BAD_REQUEST, "Invalid services duration")
    })?;

    let name_from_request = [request.name.as_deref(), request.client_name.as_deref()]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or_default()
        .trim()
        .to_string();

    let booking_failure = |e: AgendaError| {
        error!("Error creating appointment: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Erro ao criar agendamento. Tente novamente.",
        )
    };

    let (client_id, client_name) = match state
        .store
        .find_client_by_phone(user_id, phone)
        .await
        .map_err(booking_failure)?
    {
        None => {
            let client_id = state
                .store
                .create_client(Client {
                    id: None,
                    name: name_from_request.clone(),
                    phone: phone.to_string(),
                    notes: String::new(),
                    user_id: user_id.to_string(),
                })
                .await
                .map_err(booking_failure)?;
            info!("Created client {} for user={}", client_id, user_id);
            (client_id, name_from_request.clone())
        }
        Some(client) => {
            let client_id = client.id.unwrap_or_default();
            if !name_from_request.is_empty() && client.name.is_empty() {
                state
                    .store
                    .update_client_name(&client_id, &name_from_request)
                    .await
                    .map_err(booking_failure)?;
                (client_id, name_from_request.clone())
            } else {
                (client_id, client.name)
            }
        }
    };

    let appointment = Appointment {
        id: None,
        client: AppointmentClient {
            client_id,
            phone: phone.to_string(),
            name: if client_name.is_empty() {
                name_from_request
            } else {
                client_name
            },
        },
        created_at: None,
        date: date.to_string(),
        services,
        start_time: start_time.to_string(),
        end_time: end,
        total_duration,
        total_price,
        user_id: user_id.to_string(),
        status: STATUS_PENDING.to_string(),
    };

    let appointment_id = state
        .store
        .create_appointment(appointment)
        .await
        .map_err(booking_failure)?;
    info!(
        "Appointment {} created for user={} on {} at {}",
        appointment_id, user_id, date, start_time
    );

    Ok(Json(BookingResponse {
        success: true,
        appointment_id,
        message: "Agendamento criado com sucesso!".to_string(),
    }))
}

/// Handler listing the professionals; a store failure yields an empty list.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/professionals",
    responses(
        (status = 200, description = "All professionals", body = ProfessionalsResponse)
    ),
    tag = "Booking"
))]
pub async fn professionals_handler(
    State(state): State<Arc<SlotsState>>,
) -> Json<ProfessionalsResponse> {
    let professionals = state
        .store
        .list_professionals()
        .await
        .unwrap_or_else(|e| {
            warn!("Error fetching professionals: {}", e);
            Vec::new()
        });
    Json(ProfessionalsResponse { professionals })
}
