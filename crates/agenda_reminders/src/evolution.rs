// --- File: crates/agenda_reminders/src/evolution.rs ---
//! Text messages through the Evolution WhatsApp gateway.

use agenda_common::http::client::DEFAULT_TIMEOUT_SECS;
use agenda_common::{
    create_client, external_service_error, AgendaError, BoxFuture, MessageReceipt,
    MessagingService, SchedulingStore,
};
use agenda_config::EvolutionConfig;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Evolution-specific error types.
#[derive(Error, Debug)]
pub enum EvolutionError {
    /// Error occurred during a gateway request
    #[error("Evolution API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the gateway
    #[error("Evolution API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// The instance isn't recorded as OPEN or CONNECTED
    #[error("Instance {0} is not OPEN or CONNECTED")]
    InstanceNotConnected(String),

    #[error("Invalid phone number: {0:?}")]
    InvalidPhone(String),

    /// Missing or incomplete gateway configuration
    #[error("Evolution configuration missing or incomplete")]
    ConfigError,

    /// The instance status could not be read
    #[error("Instance status lookup failed: {0}")]
    StatusLookup(String),
}

impl From<EvolutionError> for AgendaError {
    fn from(err: EvolutionError) -> Self {
        match err {
            EvolutionError::ConfigError => AgendaError::ConfigError(err.to_string()),
            EvolutionError::InvalidPhone(_) => AgendaError::ValidationError(err.to_string()),
            other => external_service_error("evolution", other),
        }
    }
}

/// Digits of `phone` with the Brazilian country code `55` in front.
/// `None` when there are no digits at all.
pub fn format_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else if digits.starts_with("55") {
        Some(digits)
    } else {
        Some(format!("55{digits}"))
    }
}

/// Whether an instance state means the session can send.
pub fn is_connected_state(state: &str) -> bool {
    let state = state.trim();
    state.eq_ignore_ascii_case("OPEN") || state.eq_ignore_ascii_case("CONNECTED")
}

/// Human readable message of a gateway error body, looked up in
/// `response.message`, `message` and `error`, in that order.
pub fn gateway_error_message(body: &Value) -> Option<String> {
    fn flatten(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| flatten(item, out)),
            Value::String(s) => out.push(s.clone()),
            Value::Null => {}
            other => out.push(other.to_string()),
        }
    }

    let candidate = [
        body.pointer("/response/message"),
        body.get("message"),
        body.get("error"),
    ]
    .into_iter()
    .flatten()
    .find(|v| !v.is_null())?;

    let mut parts = Vec::new();
    flatten(candidate, &mut parts);
    Some(parts.join(", "))
}

#[derive(Serialize, Debug)]
struct SendTextRequest<'a> {
    number: &'a str,
    text: &'a str,
}

/// Sends WhatsApp text messages through the Evolution gateway.
///
/// Instance states are read from the scheduling store; the gateway is only
/// called for instances recorded as connected.
pub struct EvolutionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    store: Arc<dyn SchedulingStore>,
}

impl EvolutionClient {
    pub fn new(
        config: &EvolutionConfig,
        store: Arc<dyn SchedulingStore>,
    ) -> Result<Self, EvolutionError> {
        if config.base_url.trim().is_empty() {
            return Err(EvolutionError::ConfigError);
        }
        if config.api_key.is_empty() {
            warn!("Evolution api key is empty; the gateway will reject requests");
        }
        let timeout = config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let http = create_client(timeout, true)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            store,
        })
    }

    pub async fn is_instance_connected(&self, instance: &str) -> Result<bool, EvolutionError> {
        let state = self
            .store
            .find_instance_status(instance)
            .await
            .map_err(|e| EvolutionError::StatusLookup(e.to_string()))?;
        Ok(state.as_deref().is_some_and(is_connected_state))
    }

    pub async fn send_text_message(
        &self,
        instance: &str,
        phone: &str,
        text: &str,
    ) -> Result<MessageReceipt, EvolutionError> {
        if !self.is_instance_connected(instance).await? {
            return Err(EvolutionError::InstanceNotConnected(instance.to_string()));
        }
        let number =
            format_phone(phone).ok_or_else(|| EvolutionError::InvalidPhone(phone.to_string()))?;

        let url = format!("{}/message/sendText/{}", self.base_url, instance);
        debug!("Evolution API Request: POST {}", url);

        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&SendTextRequest {
                number: &number,
                text,
            })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let json: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = gateway_error_message(&json).unwrap_or_else(|| {
                if body.is_empty() {
                    "Unknown error".to_string()
                } else {
                    body.clone()
                }
            });
            error!("Evolution API returned {}: {}", status, message);
            return Err(EvolutionError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        info!("Evolution API Response: {} {}", status, url);
        Ok(MessageReceipt {
            id: json
                .pointer("/key/id")
                .and_then(Value::as_str)
                .map(str::to_string),
            status: json
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("sent")
                .to_string(),
        })
    }
}

impl MessagingService for EvolutionClient {
    fn send_text<'a>(
        &'a self,
        instance: &'a str,
        phone: &'a str,
        text: &'a str,
    ) -> BoxFuture<'a, MessageReceipt, AgendaError> {
        Box::pin(async move {
            self.send_text_message(instance, phone, text)
                .await
                .map_err(AgendaError::from)
        })
    }
}
