//! Scheduling store implementations for Agenda
//!
//! Two implementations of [`agenda_common::SchedulingStore`] live here:
//!
//! - [`SqlSchedulingStore`], built on a SQLx `Any` pool (SQLite by default)
//! - [`InMemorySchedulingStore`], used when the database is disabled and in tests
//!
//! [`SchedulingStoreFactory`] picks one from the application configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use agenda_config::AppConfig;
//! use agenda_db::SchedulingStoreFactory;
//! use std::sync::Arc;
//!
//! async fn setup_store() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(AppConfig::default());
//!     let _store = SchedulingStoreFactory::new().from_app_config(&config).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use factory::SchedulingStoreFactory;
pub use repositories::{InMemorySchedulingStore, SqlSchedulingStore};
