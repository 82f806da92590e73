use santa_core::draw::DrawConfig;
use santa_core::solver::DEFAULT_MAX_SEARCH_STEPS;

use crate::auth::jwt::JwtConfig;

/// Which [`EventStore`](santa_core::store::EventStore) implementation to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at the given connection URL.
    Postgres { database_url: String },
    /// Process-local store; state is lost on restart.
    Memory,
}

impl StoreBackend {
    /// Short name reported by the health check.
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Postgres { .. } => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Storage backend (default: `postgres`).
    pub store: StoreBackend,
    /// Solver settings for draws and redraws.
    pub draw: DrawConfig,
    /// JWT validation settings.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `STORE_BACKEND`         | `postgres` (or `memory`)   |
    /// | `DATABASE_URL`          | required for `postgres`    |
    /// | `DRAW_SHUFFLE`          | `true`                     |
    /// | `DRAW_MAX_SEARCH_STEPS` | `1000000` (`0` = no limit) |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let store = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .expect("DATABASE_URL must be set when STORE_BACKEND=postgres"),
            },
            other => panic!("STORE_BACKEND must be `postgres` or `memory`, got `{other}`"),
        };

        let shuffle: bool = std::env::var("DRAW_SHUFFLE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("DRAW_SHUFFLE must be `true` or `false`");

        let max_search_steps: u64 = std::env::var("DRAW_MAX_SEARCH_STEPS")
            .unwrap_or_else(|_| DEFAULT_MAX_SEARCH_STEPS.to_string())
            .parse()
            .expect("DRAW_MAX_SEARCH_STEPS must be a valid u64");

        let draw = DrawConfig {
            shuffle,
            max_search_steps: (max_search_steps > 0).then_some(max_search_steps),
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store,
            draw,
            jwt,
        }
    }
}
