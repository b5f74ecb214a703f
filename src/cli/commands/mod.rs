pub mod admin;
pub mod seed;

use std::sync::Arc;

use anyhow::Context;

use crate::config::DatabaseConfig;
use crate::database::{DatabaseManager, PgStore, Store};

/// Connects (and migrates) using DATABASE_URL from the environment.
pub(crate) async fn open_store() -> anyhow::Result<Arc<dyn Store>> {
    let config = DatabaseConfig::from_env()?;
    let pool = DatabaseManager::connect(&config)
        .await
        .context("database connection failed")?;
    Ok(Arc::new(PgStore::new(pool)))
}
