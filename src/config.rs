use std::{env, str::FromStr};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Prefix for share URLs handed to organizers, without a trailing slash.
    pub public_base_url: String,
    pub session_idle_minutes: i64,
    /// Enables `POST /dev/login`, which stands in for the external auth service.
    pub dev_login: bool,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://rollcall.db?mode=rwc".to_owned(),
            bind_addr: "0.0.0.0:8080".to_owned(),
            public_base_url: "http://localhost:8080".to_owned(),
            session_idle_minutes: 60,
            dev_login: false,
            max_connections: 16,
        }
    }
}

impl Config {
    /// Reads `.env` if there is one, then the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.public_base_url),
            session_idle_minutes: parse_var(&lookup, "SESSION_IDLE_MINUTES", defaults.session_idle_minutes)?,
            dev_login: parse_var(&lookup, "DEV_LOGIN", defaults.dev_login)?,
            max_connections: parse_var(&lookup, "MAX_CONNECTIONS", defaults.max_connections)?,
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key}={raw:?} is not valid"))),
    }
}
