//! Runtime settings from the environment (optionally seeded from a `.env` file).

use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://autorest.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// `postgres://…` or `sqlite:…`. From `DATABASE_URL`.
    pub database_url: String,
    /// From `AUTOREST_BIND`.
    pub bind_addr: String,
    /// From `AUTOREST_MAX_CONNECTIONS`.
    pub max_connections: u32,
    /// Deadline for each store call. From `AUTOREST_STORE_TIMEOUT_MS`; unset means none.
    pub store_timeout: Option<Duration>,
    /// Request body limit in bytes. From `AUTOREST_BODY_LIMIT`.
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: DEFAULT_BIND.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            store_timeout: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("AUTOREST_BIND").unwrap_or(defaults.bind_addr),
            max_connections: parse_var(&lookup, "AUTOREST_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            store_timeout: parse_var::<u64, _>(&lookup, "AUTOREST_STORE_TIMEOUT_MS")?
                .map(Duration::from_millis),
            body_limit: parse_var(&lookup, "AUTOREST_BODY_LIMIT")?.unwrap_or(defaults.body_limit),
        })
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Settings::from_lookup(lookup(&[])).unwrap(), Settings::default());
    }

    #[test]
    fn reads_every_variable() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/notes"),
            ("AUTOREST_BIND", "0.0.0.0:8080"),
            ("AUTOREST_MAX_CONNECTIONS", "12"),
            ("AUTOREST_STORE_TIMEOUT_MS", "250"),
            ("AUTOREST_BODY_LIMIT", "4096"),
        ]))
        .unwrap();
        assert_eq!(s.database_url, "postgres://localhost/notes");
        assert_eq!(s.bind_addr, "0.0.0.0:8080");
        assert_eq!(s.max_connections, 12);
        assert_eq!(s.store_timeout, Some(Duration::from_millis(250)));
        assert_eq!(s.body_limit, 4096);
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = Settings::from_lookup(lookup(&[("AUTOREST_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for AUTOREST_MAX_CONNECTIONS: 'many'");
    }
}
