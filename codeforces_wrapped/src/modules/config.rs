use anyhow::{Context, Result};
use std::{env, fmt::Display, str::FromStr};
use tokio::time::Duration;

pub const DEFAULT_API_URL: &str = "https://codeforces.com/api";
pub const DEFAULT_REFERENCE_HANDLE: &str = "tourist";

/// Runtime settings read from the environment (and `.env` through dotenvy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub reference_handle: String,
    pub fetch_workers: usize,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = string_or(&lookup, "CODEFORCES_API_URL", DEFAULT_API_URL);
        let cache_ttl: u64 = parse_or(&lookup, "CACHE_TTL", 1800)?;
        let cache_capacity: usize = parse_or(&lookup, "CACHE_CAPACITY", 100)?;
        let reference_handle = string_or(&lookup, "REFERENCE_HANDLE", DEFAULT_REFERENCE_HANDLE);
        let fetch_workers: usize = parse_or(&lookup, "FETCH_WORKERS", 2)?;
        let port: u16 = parse_or(&lookup, "PORT", 8000)?;

        Ok(Self {
            api_url,
            cache_ttl: Duration::from_secs(cache_ttl),
            cache_capacity,
            reference_handle,
            fetch_workers,
            port,
        })
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| {
        tracing::warn!(
            "{} environment variable is not set. Default value `{}` will be used.",
            key,
            default
        );
        String::from(default)
    })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().with_context(|| {
            let message = format!("{} environment variable has invalid value `{}`", key, value);
            tracing::error!(message);
            message
        }),
        None => {
            tracing::warn!(
                "{} environment variable is not set. Default value `{}` will be used.",
                key,
                default
            );
            Ok(default)
        }
    }
}
