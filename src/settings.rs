use anyhow::{Context, bail};
use ballchasing_api::client::{ApiConfig, BALLCHASING_API, DEFAULT_TIMEOUT};
use std::time::Duration;

pub const API_KEY_VAR: &str = "BALLCHASING_API_KEY";
pub const API_URL_VAR: &str = "BALLCHASING_API_URL";
pub const TIMEOUT_VAR: &str = "BALLCHASING_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiConfig,
}

impl Settings {
    /// Read configuration from the process environment. Called once at startup.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let Some(api_key) = non_empty(API_KEY_VAR) else {
            bail!("Missing API key: {API_KEY_VAR} is not set!");
        };

        let base_url = non_empty(API_URL_VAR).unwrap_or_else(|| BALLCHASING_API.to_owned());

        let timeout = match non_empty(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{TIMEOUT_VAR} must be a whole number of seconds, got {raw:?}"))?;
                if secs == 0 {
                    bail!("{TIMEOUT_VAR} must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self { api: ApiConfig { api_key, base_url, timeout } })
    }
}
