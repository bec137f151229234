//! # ratelimit-probe
//!
//! Finds the request rate at which an HTTP endpoint starts answering with
//! 429 Too Many Requests.
//!
//! A probe is a sequence of trials. Each trial runs `rate` concurrent
//! workers for a fixed duration, every worker sending one request per
//! second. If no request in a trial was throttled, the probe cools down and
//! tries again at `rate + step`. The first trial with any 429 ends the probe.
//!
//! ## Usage
//!
//! ```bash
//! # GET probe, starting at 5 req/s and stepping by 5
//! ratelimit-probe -url https://api.example.com/search
//!
//! # Form POST
//! ratelimit-probe -url https://example.com/login -method POST -data 'user=a&pass=b'
//!
//! # Stop at 200 req/s if nothing throttles by then
//! ratelimit-probe --url https://api.example.com --step 20 --max-rate 200
//! ```

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod prober;
pub mod report;
pub mod trial;

pub use config::ProbeConfig;
pub use controller::{
    decide, Decision, EscalationController, EscalationState, ProbeOutcome, ProbeState,
};
pub use error::{ProbeError, Result};
pub use prober::{HttpProber, Prober};
pub use trial::{HttpMethod, Outcome, TrialConfig, TrialResult};
