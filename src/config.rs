//! Configuration module

use std::env;
use std::str::FromStr;

/// Key-value backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local map, lost on restart
    Memory,
    /// PostgreSQL table keyed by (namespace, key)
    Postgres,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "fake" => Ok(BackendKind::Memory),
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            other => Err(format!("unknown backend '{}', expected 'memory' or 'postgres'", other)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Backend holding the A1 namespace
    pub backend: BackendKind,

    /// Database connection URL (postgres backend only)
    pub database_url: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Namespace shared by policy types, instances and metadata
    pub namespace: String,

    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let backend = env::var("A1_BACKEND")
            .map(|b| b.parse())
            .unwrap_or(Ok(BackendKind::Memory))?;

        Ok(Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),

            backend,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://a1:a1@localhost/a1".to_string()),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),

            namespace: env::var("A1_NAMESPACE")
                .unwrap_or_else(|_| crate::storage::A1_NAMESPACE.to_string()),

            json_logs: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 10000,
            backend: BackendKind::Memory,
            database_url: "postgres://a1:a1@localhost/a1".to_string(),
            db_max_connections: 10,
            namespace: crate::storage::A1_NAMESPACE.to_string(),
            json_logs: false,
            environment: "development".to_string(),
        }
    }
}
