//! Environment-driven configuration for the API binary.

use std::net::SocketAddr;

use storefront::auth::DEFAULT_TOKEN_TTL_HOURS;

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Shared HMAC secret for bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub token_ttl_hours: i64,
}

/// Configuration failures, reported at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `BIND_ADDR` did not parse as a socket address.
    #[error("invalid BIND_ADDR: {0}")]
    InvalidBindAddr(String),
    /// `TOKEN_TTL_HOURS` did not parse as a positive integer.
    #[error("invalid TOKEN_TTL_HOURS: {0}")]
    InvalidTokenTtl(String),
    /// `JWT_SECRET` is required outside of tests.
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,
}

impl Config {
    /// Read the configuration from the environment.
    ///
    /// `BIND_ADDR` defaults to `127.0.0.1:5000`, `TOKEN_TTL_HOURS` to 7 days.
    /// `JWT_SECRET` has no default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::InvalidBindAddr(std::env::var("BIND_ADDR").unwrap_or_default())
            })?;
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?;
        let token_ttl_hours = match std::env::var("TOKEN_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or(ConfigError::InvalidTokenTtl(raw))?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };
        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl_hours,
        })
    }
}
