/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (after reading `.env`
/// if present) into a typed [`Config`] that is shared through `AppState`.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 5000)
/// - `PRODUCTION`: `true` enables `Secure` cookies and HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string, or `memory://` (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `SESSION_SECRET`: session signing key, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: session lifetime (default: 24)
/// - `BOOTSTRAP_ADMIN`: create the admin account on startup (default: true)
/// - `ADMIN_EMAIL`, `ADMIN_USERNAME`, `ADMIN_PASSWORD`: bootstrap admin
/// - `LOG_FORMAT`: `json` for JSON log lines (default: text)
/// - `RUST_LOG`: log filter
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const DEFAULT_ADMIN_EMAIL: &str = "william.padilla@uniminuto.edu.co";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub bootstrap: BootstrapConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Served over HTTPS; marks cookies `Secure` and sends HSTS
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL, or `memory://` for the in-memory store
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Whether the in-memory store was requested
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory:")
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Signing key for session tokens
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,
}

/// Bootstrap admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub enabled: bool,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Log output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

fn var_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

fn string_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `SESSION_SECRET` is missing
    /// - `SESSION_SECRET` is shorter than 32 characters
    /// - a numeric or boolean variable does not parse
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;

        let config = Self {
            api: ApiConfig {
                host: string_or("API_HOST", "0.0.0.0"),
                port: var_or("API_PORT", 5000)?,
                production: var_or("PRODUCTION", false)?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            session: SessionConfig {
                secret: session_secret,
                ttl_hours: var_or("SESSION_TTL_HOURS", 24)?,
            },
            bootstrap: BootstrapConfig {
                enabled: var_or("BOOTSTRAP_ADMIN", true)?,
                email: string_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
                username: string_or("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
                password: string_or("ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
            },
            logging: LoggingConfig {
                json: string_or("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that parsing alone cannot
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }
        if self.session.ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }
        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Configuration for tests: in-memory store, no bootstrap, fixed secret
    pub fn for_tests() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                production: false,
            },
            database: DatabaseConfig {
                url: "memory://".to_string(),
                max_connections: 1,
            },
            session: SessionConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                ttl_hours: 1,
            },
            bootstrap: BootstrapConfig {
                enabled: false,
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                username: DEFAULT_ADMIN_USERNAME.to_string(),
                password: DEFAULT_ADMIN_PASSWORD.to_string(),
            },
            logging: LoggingConfig { json: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_tests();
        config.api.port = 8080;

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = Config::for_tests();
        config.session.secret = "too-short".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_url_detected() {
        let mut config = Config::for_tests();
        assert!(config.database.is_memory());

        config.database.url = "postgresql://localhost/taskboard".to_string();
        assert!(!config.database.is_memory());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let json = serde_json::to_value(Config::for_tests()).unwrap();

        assert!(json["session"].get("secret").is_none());
        assert!(json["bootstrap"].get("password").is_none());
    }
}
