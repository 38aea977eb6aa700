//! Process configuration read from the environment.
//!
//! A `.env` file, when present, is loaded by `main` before [`Config::from_env`]
//! runs. Numeric values that fail to parse fall back to their defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_APP_URL: &str = "http://localhost:5173";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Postgres connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Origin of the viewer app that share links redirect to.
    pub app_url: String,
    /// Origin this server is reachable at; prefixes committed content URLs.
    pub public_base_url: String,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: optional
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `APP_URL`: default `http://localhost:5173`
    /// - `PUBLIC_BASE_URL`: default `http://localhost:3000`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: env_string("DATABASE_URL"),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            app_url: origin(env_string("APP_URL").as_deref().unwrap_or(DEFAULT_APP_URL)),
            public_base_url: origin(env_string("PUBLIC_BASE_URL").as_deref().unwrap_or(DEFAULT_PUBLIC_BASE_URL)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            app_url: DEFAULT_APP_URL.to_owned(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key).map(|v| v.trim().parse::<T>()) {
        Ok(Ok(value)) => value,
        _ => default,
    }
}

/// Non-empty, trimmed value of `key`.
fn env_string(key: &str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

fn origin(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}
