use std::fmt;
use thiserror::Error;

/// The base error type for all Agenda errors.
///
/// Each crate can extend this by implementing From<SpecificError> for AgendaError.
#[derive(Error, Debug)]
pub enum AgendaError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for AgendaError {
    fn status_code(&self) -> u16 {
        match self {
            AgendaError::HttpError(_) => 500,
            AgendaError::ParseError(_) => 400,
            AgendaError::ConfigError(_) => 500,
            AgendaError::ValidationError(_) => 400,
            AgendaError::DatabaseError(_) => 500,
            AgendaError::ExternalServiceError { .. } => 502,
            AgendaError::NotFoundError(_) => 404,
            AgendaError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for AgendaError {
    fn from(err: reqwest::Error) -> Self {
        AgendaError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for AgendaError {
    fn from(err: serde_json::Error) -> Self {
        AgendaError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for AgendaError {
    fn from(err: std::io::Error) -> Self {
        AgendaError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn not_found<T: fmt::Display>(message: T) -> AgendaError {
    AgendaError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> AgendaError {
    AgendaError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
