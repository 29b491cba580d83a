// --- File: crates/agenda_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared records
pub mod services; // Store and messaging abstractions

// Re-export error types and utilities for easier access
pub use error::{external_service_error, not_found, AgendaError, HttpStatusCode};

// Re-export HTTP utilities for easier access
pub use http::client::create_client;

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

pub use services::{BoxFuture, MessageReceipt, MessagingService, SchedulingStore};
