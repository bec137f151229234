//! Per-trial types: what a trial is asked to do and what it observed.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// HTTP method used for probe requests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET with no body
    #[default]
    #[serde(alias = "get")]
    Get,
    /// POST with a form-encoded body
    #[serde(alias = "post")]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(ProbeError::InvalidMethod(s.to_string())),
        }
    }
}

/// Everything one trial needs. Immutable once the trial starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrialConfig {
    /// Endpoint under test
    pub target_url: String,

    /// Request method
    pub method: HttpMethod,

    /// Entity body, sent only with POST
    pub body: Option<String>,

    /// Number of concurrent workers (the RPS under test)
    pub worker_count: u64,

    /// How long the trial runs
    pub trial_duration: Duration,

    /// Time between two requests of the same worker
    pub request_interval: Duration,

    /// Cap on a single request, independent of the trial deadline
    pub request_timeout: Duration,
}

impl TrialConfig {
    /// Most requests the trial can possibly issue: one per worker per tick.
    pub fn max_requests(&self) -> u64 {
        let interval = self.request_interval.as_nanos().max(1);
        let ticks = self.trial_duration.as_nanos().div_ceil(interval);
        self.worker_count
            .saturating_mul(u64::try_from(ticks).unwrap_or(u64::MAX))
    }
}

/// Classification of a single request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// HTTP 200
    Success,
    /// HTTP 429
    Throttled,
    /// Any other status, or a build/transport failure
    OtherError,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Success,
            StatusCode::TOO_MANY_REQUESTS => Self::Throttled,
            _ => Self::OtherError,
        }
    }
}

/// Outcome counts of one trial (or of one worker, before merging)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrialResult {
    pub success_count: u64,
    pub throttled_count: u64,
    pub other_error_count: u64,

    /// Wall time from trial start until every worker was joined
    pub observed_duration: Duration,
}

impl TrialResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request outcome
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Success => self.success_count += 1,
            Outcome::Throttled => self.throttled_count += 1,
            Outcome::OtherError => self.other_error_count += 1,
        }
    }

    /// Fold another tally's counts into this one
    pub fn merge(&mut self, other: &TrialResult) {
        self.success_count += other.success_count;
        self.throttled_count += other.throttled_count;
        self.other_error_count += other.other_error_count;
    }

    pub fn total_requests(&self) -> u64 {
        self.success_count + self.throttled_count + self.other_error_count
    }

    /// Requests per second actually achieved over the observed duration
    pub fn achieved_rate(&self) -> f64 {
        let secs = self.observed_duration.as_secs_f64();
        if secs > 0.0 {
            self.total_requests() as f64 / secs
        } else {
            0.0
        }
    }

    /// Whether any request was answered with 429
    pub fn is_throttled(&self) -> bool {
        self.throttled_count > 0
    }
}
