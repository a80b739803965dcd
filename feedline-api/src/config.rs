/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `DATABASE_URL`: PostgreSQL connection string (optional; in-memory storage when unset)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DATABASE_MIN_CONNECTIONS`: Idle connections kept open (default: 0)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECS`: Wait for a free connection (default: 30)
/// - `DATABASE_IDLE_TIMEOUT_SECS`, `DATABASE_MAX_LIFETIME_SECS`: connection
///   recycling (defaults: 600, 1800; `0` disables)
/// - `DATABASE_TEST_BEFORE_ACQUIRE`: Ping before use (default: true)
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 characters)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: *)
/// - `ARGON2_MEMORY_KIB`, `ARGON2_ITERATIONS`, `ARGON2_PARALLELISM`: password hash cost
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use feedline_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use feedline_shared::auth::password::PasswordParams;
use feedline_shared::db::pool::DatabaseConfig;
use serde::Serialize;
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration; `None` runs on in-memory storage
    pub database: Option<DatabaseConfig>,

    /// Token configuration
    pub jwt: JwtConfig,

    /// Password hashing cost
    pub password: PasswordConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
}

/// Token configuration
#[derive(Debug, Clone, Serialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<PasswordConfig> for PasswordParams {
    fn from(config: PasswordConfig) -> Self {
        PasswordParams {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let params = PasswordParams::default();
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }
}

/// Reads a duration in seconds where `0` means "never"
fn parse_secs_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Option<u64>,
) -> anyhow::Result<Option<u64>> {
    let secs = parse_or(lookup, key, default.unwrap_or(0))?;
    Ok((secs > 0).then_some(secs))
}

fn database_from(
    lookup: &impl Fn(&str) -> Option<String>,
    url: String,
) -> anyhow::Result<DatabaseConfig> {
    let defaults = DatabaseConfig::default();

    Ok(DatabaseConfig {
        url,
        max_connections: parse_or(lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
        min_connections: parse_or(lookup, "DATABASE_MIN_CONNECTIONS", defaults.min_connections)?,
        acquire_timeout_secs: parse_or(
            lookup,
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            defaults.acquire_timeout_secs,
        )?,
        idle_timeout_secs: parse_secs_or(
            lookup,
            "DATABASE_IDLE_TIMEOUT_SECS",
            defaults.idle_timeout_secs,
        )?,
        max_lifetime_secs: parse_secs_or(
            lookup,
            "DATABASE_MAX_LIFETIME_SECS",
            defaults.max_lifetime_secs,
        )?,
        test_before_acquire: parse_or(
            lookup,
            "DATABASE_TEST_BEFORE_ACQUIRE",
            defaults.test_before_acquire,
        )?,
    })
}

/// Parses `key` from `lookup`, falling back to `default` when unset
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, value)),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric variable has an invalid value
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = parse_or(&lookup, "API_PORT", 8080u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(database_from(&lookup, url)?),
            None => None,
        };

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database,
            jwt: JwtConfig {
                secret: jwt_secret,
            },
            password,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
