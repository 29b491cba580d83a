//! Factory for the scheduling store
//!
//! Picks the store implementation for the running configuration: the SQL store
//! when `use_database` is set, the in-memory store otherwise.

use crate::client::DbClient;
use crate::error::DbError;
use crate::repositories::{InMemorySchedulingStore, SqlSchedulingStore};
use agenda_common::SchedulingStore;
use agenda_config::AppConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Factory for scheduling stores
#[derive(Debug, Clone, Default)]
pub struct SchedulingStoreFactory;

impl SchedulingStoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create the scheduling store described by the application configuration.
    ///
    /// # Errors
    ///
    /// When `use_database` is set, fails if the database section is missing,
    /// the connection fails or the schema cannot be created.
    pub async fn from_app_config(
        &self,
        config: &Arc<AppConfig>,
    ) -> Result<Arc<dyn SchedulingStore>, DbError> {
        if !config.use_database {
            warn!("Database disabled; scheduling data is kept in memory only");
            return Ok(Arc::new(InMemorySchedulingStore::new()));
        }

        debug!("Creating SQL scheduling store from application configuration");
        let db_client = DbClient::new(config).await?;
        let store = self.sql_store(db_client).await?;
        info!("Using SQL scheduling store");
        Ok(Arc::new(store))
    }

    /// Wrap an existing client, making sure the schema exists.
    pub async fn sql_store(&self, db_client: DbClient) -> Result<SqlSchedulingStore, DbError> {
        let store = SqlSchedulingStore::new(db_client);
        store.init_schema().await?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_config::DatabaseConfig;

    #[tokio::test]
    async fn disabled_database_falls_back_to_memory() {
        let config = Arc::new(AppConfig::default());
        let store = SchedulingStoreFactory::new()
            .from_app_config(&config)
            .await
            .unwrap();
        assert!(store.list_professionals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enabled_database_without_section_is_rejected() {
        let config = Arc::new(AppConfig {
            use_database: true,
            ..AppConfig::default()
        });
        let err = SchedulingStoreFactory::new()
            .from_app_config(&config)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DbError::ConfigError(_)));
    }

    #[tokio::test]
    async fn enabled_database_creates_schema() {
        let config = Arc::new(AppConfig {
            use_database: true,
            database: Some(DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            }),
            ..AppConfig::default()
        });
        let store = SchedulingStoreFactory::new()
            .from_app_config(&config)
            .await
            .unwrap();
        assert_eq!(store.find_settings("pro-1").await.unwrap(), None);
    }
}
