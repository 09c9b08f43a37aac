use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use careers_db::MEMORY_SCHEME;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the local identity provider.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// HMAC-SHA256 secret used to sign and verify ID tokens.
    pub token_secret: String,
    /// ID token lifetime in minutes (default: 60).
    pub token_expiry_mins: i64,
    /// Mark new accounts verified on creation (default: false).
    pub auto_verify_email: bool,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the token secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Document store URL (default: `memory://`).
    pub store_url: String,
    /// Directory profile photos are written to and served from.
    pub upload_dir: PathBuf,
    /// Externally visible base URL, used in verification links and photo URLs.
    pub public_base_url: String,
    pub identity: IdentityConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5001`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORE_URL`            | `memory://`                |
    /// | `UPLOAD_DIR`           | `./uploads`                |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:5001`    |
    /// | `ID_TOKEN_SECRET`      | **required**               |
    /// | `ID_TOKEN_EXPIRY_MINS` | `60`                       |
    /// | `AUTO_VERIFY_EMAIL`    | `false`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("HOST", "0.0.0.0".to_string())?;
        let port = env_or("PORT", 5001u16)?;

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173".to_string())?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = env_or("REQUEST_TIMEOUT_SECS", 30u64)?;
        let store_url = env_or("STORE_URL", MEMORY_SCHEME.to_string())?;
        let upload_dir = PathBuf::from(env_or("UPLOAD_DIR", "./uploads".to_string())?);
        let public_base_url = env_or("PUBLIC_BASE_URL", "http://localhost:5001".to_string())?
            .trim_end_matches('/')
            .to_string();

        let token_secret = std::env::var("ID_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("ID_TOKEN_SECRET"))?;
        let token_expiry_mins = env_or("ID_TOKEN_EXPIRY_MINS", 60i64)?;
        if token_expiry_mins <= 0 {
            return Err(ConfigError::Invalid {
                var: "ID_TOKEN_EXPIRY_MINS",
                value: token_expiry_mins.to_string(),
                reason: "must be positive".into(),
            });
        }
        let auto_verify_email = env_or("AUTO_VERIFY_EMAIL", false)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store_url,
            upload_dir,
            public_base_url,
            identity: IdentityConfig {
                token_secret,
                token_expiry_mins,
                auto_verify_email,
            },
        })
    }
}

/// Read and parse `var`, falling back to `default` when unset.
fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
