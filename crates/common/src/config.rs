//! Application configuration.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Bootstrap (seed super-admin) configuration.
    pub bootstrap: BootstrapConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Authentication configuration.
///
/// Lifetime strings must match `<integer><ms|s|m|h|d>`; anything else is a
/// fatal configuration error at startup, never a per-request failure.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access credentials.
    pub access_secret: String,
    /// Secret used to sign refresh credentials (distinct from access).
    pub refresh_secret: String,
    /// Access credential lifetime, e.g. `15m`.
    #[serde(default = "default_access_expires")]
    pub access_expires: String,
    /// Refresh credential lifetime, e.g. `7d`.
    #[serde(default = "default_refresh_expires")]
    pub refresh_expires: String,
}

/// Seed super-admin configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Email of the default super-admin ensured at startup.
    pub admin_email: String,
    /// Password of the default super-admin.
    pub admin_password: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_access_expires() -> String {
    "15m".to_string()
}

fn default_refresh_expires() -> String {
    "7d".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `REGFEED_ENV`)
    /// 3. Environment variables with `REGFEED` prefix
    pub fn load() -> AppResult<Self> {
        let env = std::env::var("REGFEED_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("REGFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("REGFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)^(\d+)(ms|s|m|h|d)$").unwrap()
});

/// Parse a credential-lifetime string of the form `<integer><unit>`.
///
/// Accepted units: `ms`, `s`, `m`, `h`, `d`. Malformed values are a
/// configuration error; callers are expected to treat that as fatal.
pub fn parse_duration(value: &str, key: &str) -> AppResult<chrono::Duration> {
    let captures = DURATION_PATTERN.captures(value).ok_or_else(|| {
        AppError::Config(format!("{key} must match pattern <number><ms|s|m|h|d>"))
    })?;

    let amount: i64 = captures[1]
        .parse()
        .map_err(|_| AppError::Config(format!("{key} amount out of range")))?;

    let duration = match captures[2].to_ascii_lowercase().as_str() {
        "ms" => chrono::Duration::milliseconds(amount),
        "s" => chrono::Duration::seconds(amount),
        "m" => chrono::Duration::minutes(amount),
        "h" => chrono::Duration::hours(amount),
        _ => chrono::Duration::days(amount),
    };

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(
            parse_duration("500ms", "X").unwrap(),
            chrono::Duration::milliseconds(500)
        );
        assert_eq!(
            parse_duration("30s", "X").unwrap(),
            chrono::Duration::seconds(30)
        );
        assert_eq!(
            parse_duration("15m", "X").unwrap(),
            chrono::Duration::minutes(15)
        );
        assert_eq!(
            parse_duration("2h", "X").unwrap(),
            chrono::Duration::hours(2)
        );
        assert_eq!(
            parse_duration("7d", "X").unwrap(),
            chrono::Duration::days(7)
        );
    }

    #[test]
    fn test_parse_duration_is_case_insensitive() {
        assert_eq!(
            parse_duration("7D", "X").unwrap(),
            chrono::Duration::days(7)
        );
    }

    #[test]
    fn test_parse_duration_rejects_malformed() {
        assert!(parse_duration("15", "JWT_EXPIRES").is_err());
        assert!(parse_duration("m15", "JWT_EXPIRES").is_err());
        assert!(parse_duration("5w", "JWT_EXPIRES").is_err());
        assert!(parse_duration("", "JWT_EXPIRES").is_err());
        assert!(parse_duration("1.5h", "JWT_EXPIRES").is_err());
    }

    #[test]
    fn test_parse_duration_error_names_the_key() {
        let err = parse_duration("bogus", "REFRESH_EXPIRES").unwrap_err();
        assert!(err.to_string().contains("REFRESH_EXPIRES"));
    }
}
