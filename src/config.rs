use anyhow::Context;
use serde::Deserialize;

/// Token lifetime when `JWT_TTL_MINUTES` is not set: one day.
pub const DEFAULT_TTL_MINUTES: i64 = 1440;

/// Longest accepted token lifetime: ten years.
pub const MAX_TTL_MINUTES: i64 = 10 * 365 * 1440;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            ttl_minutes: ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok().as_deref()),
        };
        Ok(Self {
            database_url,
            max_connections,
            jwt,
        })
    }
}

/// Parses `JWT_TTL_MINUTES`, falling back to the default when the value is
/// missing, not a number, or outside `1..=MAX_TTL_MINUTES`.
fn ttl_minutes(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| (1..=MAX_TTL_MINUTES).contains(v))
        .unwrap_or(DEFAULT_TTL_MINUTES)
}
