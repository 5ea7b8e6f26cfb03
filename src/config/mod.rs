use std::{env, fmt};

use thiserror::Error;
use url::Url;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got '{0}'")]
    InvalidPort(String),

    #[error("CLIENT_URL must be an absolute http(s) URL, got '{0}'")]
    InvalidClientUrl(String),

    #[error("persistence is partially configured: {0} is missing")]
    IncompletePersistence(&'static str),
}

/// A credential that must never show up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

/// Connection details for the hosted data store. Present only when all three
/// variables are set.
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    pub database_url: Secret,
    pub supabase_url: String,
    pub supabase_anon_key: Secret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL of the browser client, without a trailing slash.
    pub client_url: String,
    pub allowed_origins: Vec<String>,
    pub stripe_secret_key: Option<Secret>,
    pub stripe_webhook_secret: Option<Secret>,
    pub persistence: Option<PersistenceConfig>,
    pub unsplash_access_key: Option<Secret>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let client_url = parse_client_url(
            &get("CLIENT_URL").unwrap_or_else(|| DEFAULT_CLIENT_URL.to_string()),
        )?;

        let allowed_origins = split_origins(
            &get("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );

        let persistence = match (
            get("DATABASE_URL"),
            get("SUPABASE_URL"),
            get("SUPABASE_ANON_KEY"),
        ) {
            (None, None, None) => None,
            (Some(database_url), Some(supabase_url), Some(anon_key)) => Some(PersistenceConfig {
                database_url: Secret::new(database_url),
                supabase_url: supabase_url.trim_end_matches('/').to_string(),
                supabase_anon_key: Secret::new(anon_key),
            }),
            (None, _, _) => return Err(ConfigError::IncompletePersistence("DATABASE_URL")),
            (_, None, _) => return Err(ConfigError::IncompletePersistence("SUPABASE_URL")),
            (_, _, None) => return Err(ConfigError::IncompletePersistence("SUPABASE_ANON_KEY")),
        };

        let production = get("RUST_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            client_url,
            allowed_origins,
            stripe_secret_key: get("STRIPE_SECRET_KEY").map(Secret::new),
            stripe_webhook_secret: get("STRIPE_WEBHOOK_SECRET").map(Secret::new),
            persistence,
            unsplash_access_key: get("UNSPLASH_ACCESS_KEY").map(Secret::new),
            production,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_client_url(raw: &str) -> Result<String, ConfigError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(raw.trim_end_matches('/').to_string())
        }
        _ => Err(ConfigError::InvalidClientUrl(raw.to_string())),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
