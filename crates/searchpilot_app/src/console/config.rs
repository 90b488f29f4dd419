//! Console configuration read from the environment (and `.env`, if present).
//!
//! | variable                   | default                 |
//! |----------------------------|-------------------------|
//! | `SEARCHPILOT_URL`          | `http://127.0.0.1:5000` |
//! | `SEARCHPILOT_POLL_MS`      | `1000`                  |
//! | `SEARCHPILOT_TIMEOUT_SECS` | `10`                    |
//! | `SEARCHPILOT_LOG`          | `file`                  |
//! | `SEARCHPILOT_STATE_DIR`    | current directory       |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use searchpilot_engine::ClientSettings;

use super::logging::LogDestination;

pub const URL_ENV: &str = "SEARCHPILOT_URL";
pub const POLL_MS_ENV: &str = "SEARCHPILOT_POLL_MS";
pub const TIMEOUT_ENV: &str = "SEARCHPILOT_TIMEOUT_SECS";
pub const LOG_ENV: &str = "SEARCHPILOT_LOG";
pub const STATE_DIR_ENV: &str = "SEARCHPILOT_STATE_DIR";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientSettings,
    pub log_destination: LogDestination,
    pub state_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut client = ClientSettings::default();
        if let Some(url) = read(URL_ENV) {
            client.base_url = url;
        }
        if let Some(raw) = read(POLL_MS_ENV) {
            let millis: u64 = raw
                .parse()
                .with_context(|| format!("{POLL_MS_ENV} must be a whole number, got '{raw}'"))?;
            if millis == 0 {
                bail!("{POLL_MS_ENV} must be greater than zero");
            }
            client.poll_interval = Duration::from_millis(millis);
        }
        if let Some(raw) = read(TIMEOUT_ENV) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number, got '{raw}'"))?;
            if secs == 0 {
                bail!("{TIMEOUT_ENV} must be greater than zero");
            }
            client.request_timeout = Duration::from_secs(secs);
        }

        let log_destination = match read(LOG_ENV) {
            Some(raw) => raw.parse().map_err(anyhow::Error::msg)?,
            None => LogDestination::File,
        };

        let state_dir = read(STATE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            client,
            log_destination,
            state_dir,
        })
    }
}
