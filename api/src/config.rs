use std::{
    env,
    fmt::Display,
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

use anyhow::{Context, anyhow};
use axum::http::HeaderValue;
use tracing::info;

const DEFAULT_DATABASE_URL: &str = "sqlite://recipes.db?mode=rwc";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "5001";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

/// Server settings, read from the environment (and `.env`, if present).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub cors_origins: Vec<HeaderValue>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            database_url: var(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
            host: try_load(&lookup, "HOST", DEFAULT_HOST)?,
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            cors_origins: parse_origins(&var(&lookup, "CORS_ORIGINS", DEFAULT_CORS_ORIGINS))?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn var(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_owned()
        })
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = var(lookup, key, default);
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("invalid {key} value `{raw}`: {e}"))
}

fn parse_origins(raw: &str) -> anyhow::Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("invalid CORS origin `{origin}`"))
        })
        .collect()
}
