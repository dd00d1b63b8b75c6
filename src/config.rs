use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const DEFAULT_DB_PATH: &str = "data/lessons.sqlite";
const DEFAULT_USER_AGENT: &str = concat!("lesson_scraper/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONCURRENCY: usize = 4;
const MAX_CONCURRENCY: usize = 64;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
}

impl Settings {
    /// Defaults, overridden by `LESSON_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("concurrency", DEFAULT_CONCURRENCY as u64)?
            .add_source(Environment::with_prefix("LESSON"))
            .build()
            .context("Failed to read settings")?;

        let settings: Settings = settings
            .try_deserialize()
            .context("Invalid LESSON_* settings")?;
        Ok(settings.clamped())
    }

    /// Keep concurrency within 1..=MAX_CONCURRENCY.
    fn clamped(mut self) -> Self {
        self.concurrency = self.concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_without_env_uses_defaults() {
        let s = Settings::load().unwrap();
        assert!(s.concurrency >= 1);
        assert!(!s.user_agent.is_empty());
    }

    #[test]
    fn concurrency_is_clamped() {
        let huge = Settings { concurrency: usize::MAX, ..Settings::default() }.clamped();
        assert_eq!(huge.concurrency, MAX_CONCURRENCY);
        let zero = Settings { concurrency: 0, ..Settings::default() }.clamped();
        assert_eq!(zero.concurrency, 1);
    }
}
