//! Configuration loading and resolution.
//!
//! Every setting resolves as CLI flag, then environment variable, then
//! built-in default. Transport mode can be set once for both providers or
//! overridden per provider.

use sbirka::sources::{kurzy, zakonyprolidi};
use sbirka::FetchMode;

pub const PRIMARY_URL_ENV: &str = "SBIRKA_PRIMARY_URL";
pub const SECONDARY_URL_ENV: &str = "SBIRKA_SECONDARY_URL";
pub const FETCH_MODE_ENV: &str = "SBIRKA_FETCH_MODE";
pub const PRIMARY_MODE_ENV: &str = "SBIRKA_PRIMARY_MODE";
pub const SECONDARY_MODE_ENV: &str = "SBIRKA_SECONDARY_MODE";

/// Raw overrides collected from the command line, before resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub primary_url: Option<String>,
    pub secondary_url: Option<String>,
    pub fetch_mode: Option<String>,
    pub primary_mode: Option<String>,
    pub secondary_mode: Option<String>,
}

/// Resolved provider endpoints and transport modes.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub primary_url: String,
    pub secondary_url: String,
    pub primary_mode: FetchMode,
    pub secondary_mode: FetchMode,
}

impl ServerConfig {
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self, String> {
        let shared_mode = setting(overrides.fetch_mode.as_deref(), FETCH_MODE_ENV);
        let primary_mode = parse_mode(
            setting(overrides.primary_mode.as_deref(), PRIMARY_MODE_ENV)
                .or_else(|| shared_mode.clone()),
        )?;
        let secondary_mode = parse_mode(
            setting(overrides.secondary_mode.as_deref(), SECONDARY_MODE_ENV).or(shared_mode),
        )?;

        Ok(Self {
            primary_url: setting(overrides.primary_url.as_deref(), PRIMARY_URL_ENV)
                .unwrap_or_else(|| zakonyprolidi::BASE_URL.to_string()),
            secondary_url: setting(overrides.secondary_url.as_deref(), SECONDARY_URL_ENV)
                .unwrap_or_else(|| kurzy::BASE_URL.to_string()),
            primary_mode,
            secondary_mode,
        })
    }
}

fn setting(explicit: Option<&str>, env_key: &str) -> Option<String> {
    if let Some(value) = explicit {
        return Some(value.to_string());
    }
    std::env::var(env_key).ok().filter(|v| !v.is_empty())
}

fn parse_mode(raw: Option<String>) -> Result<FetchMode, String> {
    match raw {
        Some(raw) => raw.parse(),
        None => Ok(FetchMode::default()),
    }
}
