//! Scheduler configuration structures.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between idle refills, in seconds.
pub const DEFAULT_REFILL_PERIOD_SECS: u64 = 60;

/// Environment variable overriding the refill period.
pub const REFILL_PERIOD_ENV: &str = "FEED_SCHEDULER_REFILL_PERIOD_SECS";

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between timer fires while started.
    #[serde(default = "default_refill_period_secs")]
    pub refill_period_secs: u64,
}

const fn default_refill_period_secs() -> u64 {
    DEFAULT_REFILL_PERIOD_SECS
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refill_period_secs: DEFAULT_REFILL_PERIOD_SECS,
        }
    }
}

impl SchedulerConfig {
    /// Builder-style setter for the refill period.
    #[must_use]
    pub const fn with_refill_period_secs(mut self, secs: u64) -> Self {
        self.refill_period_secs = secs;
        self
    }

    /// Refill period as a `Duration`.
    #[must_use]
    pub const fn refill_period(&self) -> Duration {
        Duration::from_secs(self.refill_period_secs)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message when the refill period is zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.refill_period_secs == 0 {
            return Err("refill_period_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message on malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, reading a `.env`
    /// file first if one exists. Unset values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns a message when a variable is present but not a valid value.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a message when a value cannot be parsed or fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(REFILL_PERIOD_ENV) {
            cfg.refill_period_secs = raw
                .trim()
                .parse()
                .map_err(|e| format!("{REFILL_PERIOD_ENV}: {e}"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
