// --- File: crates/agenda_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{AgendaError, HttpStatusCode};

pub mod client;

impl IntoResponse for AgendaError {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(json!({
            "error": {
                "message": self.to_string(),
                "code": status_code.as_u16(),
            }
        }));

        (status_code, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{external_service_error, not_found};

    #[test]
    fn error_renders_with_matching_status() {
        let response = not_found("Settings not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = external_service_error("evolution", "timeout").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
