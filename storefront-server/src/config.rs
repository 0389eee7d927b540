//! Storefront server configuration

use crate::auth::token::{DEFAULT_EXPIRY_HOURS, MAX_EXPIRY_HOURS};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Minimum accepted length for the token signing secret
const MIN_SECRET_LEN: usize = 32;

/// Storefront server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection URL
    pub database_url: String,
    /// Connection pool size
    pub database_max_connections: u32,
    /// HTTP bind host
    pub http_host: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HMAC secret used to sign bearer tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub token_expiry_hours: i64,
}

impl Config {
    /// Require a secret env var: must be set and long enough in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                tracing::warn!("{name} not set, using development placeholder");
                format!("dev-{name}-not-for-production-use-only")
            }
        };
        if val.len() < MIN_SECRET_LEN && environment != "development" {
            return Err(
                format!("{name} must be at least {MIN_SECRET_LEN} characters long").into(),
            );
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://storefront.db".into()),
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5),
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            token_expiry_hours: parse_expiry_hours(
                std::env::var("TOKEN_EXPIRY_HOURS").ok().as_deref(),
            ),
            environment,
        })
    }

    /// Address the HTTP listener binds to
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

/// Token lifetime from `TOKEN_EXPIRY_HOURS`; unparsable or out-of-range
/// values fall back to the default
fn parse_expiry_hours(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|h| (1..=MAX_EXPIRY_HOURS).contains(h))
        .unwrap_or(DEFAULT_EXPIRY_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET: &str = "STOREFRONT_TEST_SECRET_THAT_IS_NEVER_SET";

    #[test]
    fn test_missing_secret_uses_placeholder_in_development() {
        let secret = Config::require_secret(UNSET, "development").unwrap();
        assert!(secret.starts_with("dev-"));
        assert!(secret.len() >= MIN_SECRET_LEN);
    }

    #[test]
    fn test_missing_secret_is_fatal_in_production() {
        assert!(Config::require_secret(UNSET, "production").is_err());
    }

    #[test]
    fn test_expiry_hours_are_bounded() {
        assert_eq!(parse_expiry_hours(None), DEFAULT_EXPIRY_HOURS);
        assert_eq!(parse_expiry_hours(Some("48")), 48);
        assert_eq!(parse_expiry_hours(Some("0")), DEFAULT_EXPIRY_HOURS);
        assert_eq!(parse_expiry_hours(Some("-3")), DEFAULT_EXPIRY_HOURS);
        assert_eq!(parse_expiry_hours(Some("abc")), DEFAULT_EXPIRY_HOURS);
        assert_eq!(parse_expiry_hours(Some("8760")), MAX_EXPIRY_HOURS);
        assert_eq!(
            parse_expiry_hours(Some("9223372036854775807")),
            DEFAULT_EXPIRY_HOURS
        );
    }

    #[test]
    fn test_http_addr() {
        let config = Config {
            database_url: "sqlite::memory:".into(),
            database_max_connections: 1,
            http_host: "127.0.0.1".into(),
            http_port: 8080,
            environment: "development".into(),
            jwt_secret: "x".repeat(MIN_SECRET_LEN),
            token_expiry_hours: 24,
        };
        assert_eq!(config.http_addr(), "127.0.0.1:8080");
    }
}
