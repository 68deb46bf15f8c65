//! Application state for the inventory service.

use common::config::AppConfig;
use mongodb::{Client, Database};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: Database,
}

impl AppState {
    /// Connects to MongoDB and builds the shared state.
    pub async fn new(config: AppConfig) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        let db = client.database(&config.database);
        Ok(Self { config, db })
    }
}
