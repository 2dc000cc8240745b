use std::env;

use crate::error::AppError;
use crate::middleware::cors::parse_origins;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Where tournament state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Redis { url: String },
    /// Process-local; everything is lost on restart.
    Memory,
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `BACKEND_HOST`, `BACKEND_PORT`, `STORE_BACKEND`, `REDIS_URL` and
    /// `CORS_ALLOWED_ORIGINS` from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("BACKEND_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::config(format!("BACKEND_PORT must be a valid port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let backend = var("STORE_BACKEND").unwrap_or_else(|| "redis".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "redis" => StoreBackend::Redis {
                url: var("REDIS_URL").ok_or_else(|| {
                    AppError::config("REDIS_URL must be set when STORE_BACKEND=redis")
                })?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::config(format!(
                    "STORE_BACKEND must be 'redis' or 'memory', got '{other}'"
                )))
            }
        };

        let cors_origins = parse_origins(&var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        Ok(Self {
            host,
            port,
            store,
            cors_origins,
        })
    }

    /// Backend name for logs; never includes the Redis URL.
    pub fn store_kind(&self) -> &'static str {
        match self.store {
            StoreBackend::Redis { .. } => "redis",
            StoreBackend::Memory => "memory",
        }
    }

    /// Memory store on an ephemeral port; used by tests.
    pub fn in_memory() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            store: StoreBackend::Memory,
            cors_origins: parse_origins(""),
        }
    }
}
