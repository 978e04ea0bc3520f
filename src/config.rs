use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

/// Token lifetime in hours; must be a positive integer. A negative value
/// would wrap during the seconds conversion into a near-infinite TTL, so it
/// is rejected at startup rather than silently accepted.
fn parse_ttl_hours(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(24);
    };
    let hours: i64 = raw
        .trim()
        .parse()
        .context("JWT_TTL_HOURS must be an integer")?;
    anyhow::ensure!(hours > 0, "JWT_TTL_HOURS must be positive, got {hours}");
    Ok(hours)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_hours: parse_ttl_hours(std::env::var("JWT_TTL_HOURS").ok())?,
        };
        Ok(Self { database_url, jwt })
    }
}
