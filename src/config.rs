//! Process configuration, read from the environment.
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `SHIPPING_SECRET_KEY` | required | shared secret expected in the `shipping_secret_key` header |
//! | `HOST` | `0.0.0.0` | listen address |
//! | `PORT` | `3000` | listen port |
//! | `DATABASE_URL` | unset | PostgreSQL URL; the in-memory store is used when unset |
//! | `DATABASE_MAX_CONNECTIONS` | `5` | pool size |
//!
//! A `.env` file in the working directory is loaded first by the binary.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub secret_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret_key = var("SHIPPING_SECRET_KEY").ok_or(ConfigError::Missing("SHIPPING_SECRET_KEY"))?;

        Ok(Self {
            secret_key,
            host: parse_or(var("HOST"), "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or(var("PORT"), "PORT", DEFAULT_PORT)?,
            database_url: var("DATABASE_URL"),
            database_max_connections: parse_or(
                var("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}

// Keeps the secret and database credentials out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_key", &"<redacted>")
            .field("addr", &self.addr())
            .field("database", &self.database_url.as_ref().map(|_| "<postgres>"))
            .field("database_max_connections", &self.database_max_connections)
            .finish()
    }
}
