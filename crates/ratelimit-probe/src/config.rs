//! Probe configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};
use crate::trial::{HttpMethod, TrialConfig};

/// Complete probe configuration.
///
/// Every field has a default so a TOML file only needs to name what it
/// changes. CLI flags are applied on top of whatever is loaded here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Endpoint under test
    pub target_url: String,

    /// Request method
    pub method: HttpMethod,

    /// Body sent with POST requests
    pub body: Option<String>,

    /// Rate of the first trial (requests per second)
    pub start_rate: u64,

    /// Rate increase after each unthrottled trial
    pub rate_step: u64,

    /// Trial duration in seconds
    pub trial_duration_secs: u64,

    /// Interval between requests of one worker, in milliseconds
    pub request_interval_ms: u64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Pause between trials in seconds
    pub cooldown_secs: u64,

    /// Highest rate to try. `None` keeps escalating until throttled.
    pub max_rate: Option<u64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            method: HttpMethod::Get,
            body: None,
            start_rate: 5,
            rate_step: 5,
            trial_duration_secs: 15,
            request_interval_ms: 1000,
            request_timeout_secs: 10,
            cooldown_secs: 10,
            max_rate: None,
        }
    }
}

impl ProbeConfig {
    /// Create a config for a target with all other values at their defaults
    pub fn for_target(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ProbeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ProbeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that the values describe a runnable probe
    pub fn validate(&self) -> Result<()> {
        if self.target_url.trim().is_empty() {
            return Err(ProbeError::MissingUrl);
        }
        if self.start_rate == 0 {
            return Err(ProbeError::InvalidConfig(
                "start_rate must be at least 1".to_string(),
            ));
        }
        if self.rate_step == 0 {
            return Err(ProbeError::InvalidConfig(
                "rate_step must be at least 1".to_string(),
            ));
        }
        if self.trial_duration_secs == 0 || self.request_interval_ms == 0 {
            return Err(ProbeError::InvalidConfig(
                "trial duration and request interval must be non-zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ProbeError::InvalidConfig(
                "request_timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.request_timeout() >= self.trial_duration() {
            return Err(ProbeError::InvalidConfig(format!(
                "request timeout ({}s) must be shorter than the trial duration ({}s)",
                self.request_timeout_secs, self.trial_duration_secs
            )));
        }
        if let Some(max) = self.max_rate {
            if max < self.start_rate {
                return Err(ProbeError::InvalidConfig(format!(
                    "max_rate ({}) is below start_rate ({})",
                    max, self.start_rate
                )));
            }
        }
        Ok(())
    }

    pub fn trial_duration(&self) -> Duration {
        Duration::from_secs(self.trial_duration_secs)
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Build the config of a single trial at `rate` requests per second
    pub fn trial(&self, rate: u64) -> TrialConfig {
        TrialConfig {
            target_url: self.target_url.clone(),
            method: self.method,
            body: match self.method {
                HttpMethod::Post => Some(self.body.clone().unwrap_or_default()),
                HttpMethod::Get => None,
            },
            worker_count: rate,
            trial_duration: self.trial_duration(),
            request_interval: self.request_interval(),
            request_timeout: self.request_timeout(),
        }
    }
}
