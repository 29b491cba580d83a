// --- File: crates/agenda_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. "sqlite://data/agenda.db", AGENDA__DATABASE__URL
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Minimum level, one of trace/debug/info/warn/error.
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

// --- Evolution (WhatsApp gateway) Config ---
// The api key is normally "secret_from_env" and resolved from EVOLUTION_API_KEY.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EvolutionConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
}

// --- Reminder Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReminderConfig {
    /// Width of the window after the reminder instant in which a reminder is due.
    pub window_minutes: Option<i64>,
    /// Only salons in this UF get reminders. `None` lets every salon through.
    pub allowed_uf: Option<String>,
    /// UF assumed for salons without one.
    pub default_uf: Option<String>,
}

pub const DEFAULT_REMINDER_WINDOW_MINUTES: i64 = 5;
pub const DEFAULT_UF: &str = "MS";

impl ReminderConfig {
    pub fn window_minutes(&self) -> i64 {
        self.window_minutes
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_REMINDER_WINDOW_MINUTES)
    }

    pub fn default_uf(&self) -> &str {
        self.default_uf.as_deref().unwrap_or(DEFAULT_UF)
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_database: bool,
    #[serde(default)]
    pub use_reminders: bool,

    // --- Optional Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub evolution: Option<EvolutionConfig>,
    #[serde(default)]
    pub reminders: Option<ReminderConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8086,
            },
            use_database: false,
            use_reminders: false,
            database: None,
            logging: None,
            evolution: None,
            reminders: None,
        }
    }
}
