use std::str::FromStr;

use proc_macros::env_keys;
use tokio::time::Duration;

use crate::error::{BotError, ErrorKind, Result};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 2500;

/// Process settings read from `DISCORD_*` environment variables.
#[env_keys("DISCORD")]
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub client_id: String,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
    pub token: String,
    pub overwrite_existing: bool,
    pub remove_unregistered: bool,
    pub timeout_ms: u64,
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BotError::kind(ErrorKind::MissingSetting).push_str(key))
        };

        Ok(Self {
            client_id: required(Self::CLIENT_ID)?,
            public_key: required(Self::PUBLIC_KEY)?,
            token: required(Self::TOKEN)?,
            overwrite_existing: parse_or(&lookup, Self::OVERWRITE_EXISTING, false)?,
            remove_unregistered: parse_or(&lookup, Self::REMOVE_UNREGISTERED, false)?,
            timeout_ms: parse_or(&lookup, Self::TIMEOUT_MS, DEFAULT_TIMEOUT_MS)?,
            bind_addr: lookup(Self::BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            BotError::kind(ErrorKind::InvalidSetting).push_str(format!("{}={:?}", key, raw))
        }),
    }
}
