//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context};
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("expected 'postgres' or 'memory', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    /// Required only for the Postgres backend; see [`AppConfig::database_url`].
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub upload_dir: PathBuf,
    /// Base for generated image URLs. When unset, handlers derive it from
    /// the request `Host` header.
    pub public_base_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Reads the process environment, loading `.env` first if present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

        let token_ttl_hours: i64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 168)?;
        if token_ttl_hours <= 0 {
            return Err(anyhow!("TOKEN_TTL_HOURS must be positive"));
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 5000)))?,
            store_backend: parse_or(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?,
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5u32)?.max(1),
            jwt_secret,
            token_ttl_hours,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Database URL must be provided (no default) for the Postgres backend.
    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow!("DATABASE_URL must be set when STORE_BACKEND=postgres"))
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("invalid {} value '{}'", key, raw)),
    }
}
