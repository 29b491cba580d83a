// File: crates/agenda_slots/src/doc.rs

#![cfg(feature = "openapi")]
use crate::logic::{
    AvailableSlotsRequest, AvailableSlotsResponse, BookingResponse, CreateAppointmentRequest,
    ErrorBody, ProfessionalsResponse, SchedulingDataResponse,
};
use agenda_common::models::{
    Professional, ReminderSettings, SchedulingSettings, Service, ServiceLine, TimeRange,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::available_slots_handler,
        crate::handlers::scheduling_data_handler,
        crate::handlers::create_appointment_handler,
        crate::handlers::professionals_handler
    ),
    components(
        schemas(
            AvailableSlotsRequest,
            AvailableSlotsResponse,
            SchedulingDataResponse,
            CreateAppointmentRequest,
            BookingResponse,
            ProfessionalsResponse,
            ErrorBody,
            SchedulingSettings,
            ReminderSettings,
            TimeRange,
            Service,
            ServiceLine,
            Professional
        )
    ),
    tags(
        (name = "Booking", description = "Public booking API")
    ),
    servers(
        (url = "/api", description = "Agenda API server")
    )
)]
pub struct SlotsApiDoc;
