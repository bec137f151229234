//! Rate prober
//!
//! Runs one trial: `worker_count` tasks, each sending one request per
//! interval until a shared absolute deadline, then joins them all and merges
//! their tallies.
//!
//! Each worker owns its own [`TrialResult`] tally, so there is no shared
//! mutable state while the trial runs. The merged result only exists once
//! every worker has been joined.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::trial::{HttpMethod, Outcome, TrialConfig, TrialResult};

/// Content type of POST probe requests
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Something that can run a trial and report its counts
#[async_trait]
pub trait Prober: Send + Sync {
    /// Run one full trial. Returns only after the whole duration is spent
    /// and every worker has stopped.
    async fn run_trial(&self, trial: &TrialConfig) -> TrialResult;
}

#[async_trait]
impl<P: Prober + ?Sized> Prober for Arc<P> {
    async fn run_trial(&self, trial: &TrialConfig) -> TrialResult {
        (**self).run_trial(trial).await
    }
}

/// Prober that sends real HTTP requests
#[derive(Clone, Debug)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    /// Create a prober with a fresh connection pool
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Create a prober around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn run_trial(&self, trial: &TrialConfig) -> TrialResult {
        let trial = Arc::new(trial.clone());
        let start = Instant::now();
        let deadline = start + trial.trial_duration;

        debug!(
            workers = trial.worker_count,
            duration = ?trial.trial_duration,
            "Spawning trial workers"
        );

        let handles: Vec<_> = (0..trial.worker_count)
            .map(|worker| {
                let client = self.client.clone();
                let trial = trial.clone();
                tokio::spawn(run_worker(worker, client, trial, start, deadline))
            })
            .collect();

        let mut result = TrialResult::new();
        for joined in join_all(handles).await {
            match joined {
                Ok(tally) => result.merge(&tally),
                Err(e) => warn!("Worker task failed: {}", e),
            }
        }
        result.observed_duration = start.elapsed();

        debug!(
            total = result.total_requests(),
            elapsed = ?result.observed_duration,
            "All trial workers joined"
        );
        result
    }
}

/// One worker: fire on every tick, stop at the deadline.
///
/// A request that is in flight when the deadline passes runs to completion
/// (bounded by its own timeout); the deadline is only checked between
/// requests.
async fn run_worker(
    worker: u64,
    client: Client,
    trial: Arc<TrialConfig>,
    start: Instant,
    deadline: Instant,
) -> TrialResult {
    let mut tally = TrialResult::new();

    // interval_at panics on a zero period
    let period = trial.request_interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(start + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let expiry = sleep_until(deadline);
    tokio::pin!(expiry);

    loop {
        tokio::select! {
            biased;
            _ = &mut expiry => break,
            _ = ticker.tick() => {
                let outcome = send_request(&client, &trial).await;
                trace!(worker, ?outcome, "Request finished");
                tally.record(outcome);
            }
        }
    }

    tally
}

/// Send a single probe request and classify the response.
///
/// The response is dropped as soon as its status is read, which releases
/// the connection whatever the outcome.
pub async fn send_request(client: &Client, trial: &TrialConfig) -> Outcome {
    let mut request = client
        .request(trial.method.to_reqwest(), trial.target_url.as_str())
        .timeout(trial.request_timeout);

    if trial.method == HttpMethod::Post {
        request = request
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(trial.body.clone().unwrap_or_default());
    }

    match request.send().await {
        Ok(response) => {
            let status = response.status();
            drop(response);
            Outcome::from_status(status)
        }
        Err(e) => {
            debug!("Request to {} failed: {}", trial.target_url, e);
            Outcome::OtherError
        }
    }
}
