//! Application configuration.
//!
//! Loaded from environment variables with sensible defaults for local
//! development.

/// Application configuration shared across the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name, used in logs.
    pub service: String,
    /// Bind host.
    pub host: String,
    /// Bind port. Callers override with their service default.
    pub port: u16,
    /// MongoDB connection string.
    pub mongodb_uri: String,
    /// Database holding the inventory collections.
    pub database: String,
}

impl AppConfig {
    /// Loads the configuration from the environment for a named service.
    pub fn load_with_service(service: &str) -> Self {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let mongodb_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let database = std::env::var("MONGODB_DATABASE")
            .unwrap_or_else(|_| "keyboard_inventory".to_string());

        Self {
            service: service.to_string(),
            host,
            port,
            mongodb_uri,
            database,
        }
    }
}
