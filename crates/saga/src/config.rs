//! Application configuration loaded from environment variables.

/// Saga configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `TABLE_NAME` — inventory table name, also the sub-collection
///   key under batch-get responses (default: `"DB Inventario"`)
/// - `EVENT_BUS_NAME` — bus for downstream events (default: `"default"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub event_bus: String,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            table_name: std::env::var("TABLE_NAME")
                .unwrap_or_else(|_| "DB Inventario".to_string()),
            event_bus: std::env::var("EVENT_BUS_NAME").unwrap_or_else(|_| "default".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            table_name: "DB Inventario".to_string(),
            event_bus: "default".to_string(),
            log_level: "info".to_string(),
        }
    }
}
