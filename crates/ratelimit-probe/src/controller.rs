//! Escalation controller
//!
//! Drives the prober at rising rates until a trial sees throttling. The
//! continue/stop choice is the pure [`decide`] function; the controller only
//! adds I/O around it (running trials, printing, sleeping).

use tracing::{info, warn};

use crate::config::ProbeConfig;
use crate::prober::Prober;
use crate::report;
use crate::trial::TrialResult;

/// Phase of the escalation loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeState {
    /// About to run, or running, a trial at this rate
    Probing(u64),
    /// Trial at this rate was clean; cooling down
    Escalating(u64),
    /// Throttling first appeared at this rate
    Found(u64),
}

/// Search position. Mutated once per trial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscalationState {
    pub current_rate: u64,
    pub step: u64,
    pub max_rate: Option<u64>,
    pub found: bool,
}

impl EscalationState {
    pub fn new(start_rate: u64, step: u64, max_rate: Option<u64>) -> Self {
        Self {
            current_rate: start_rate,
            step,
            max_rate,
            found: false,
        }
    }
}

/// What to do after a trial
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Throttling observed at this rate; stop
    Found { rate: u64 },
    /// Clean trial; cool down then probe at `next_rate`
    Escalate { next_rate: u64 },
    /// Clean trial but the next rate would pass the configured maximum
    CeilingReached { last_rate: u64 },
}

/// Decide the next step from a finished trial.
///
/// Any 429 ends the search. Other failures, however many, are treated as
/// "no limit detected".
pub fn decide(state: &EscalationState, result: &TrialResult) -> Decision {
    if result.is_throttled() {
        return Decision::Found {
            rate: state.current_rate,
        };
    }

    let next_rate = state.current_rate.saturating_add(state.step);
    match state.max_rate {
        Some(max) if next_rate > max => Decision::CeilingReached {
            last_rate: state.current_rate,
        },
        _ => Decision::Escalate { next_rate },
    }
}

/// How a probe run ended
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeOutcome {
    /// Throttling first observed at `rate`
    LimitFound { rate: u64, result: TrialResult },
    /// Stopped at the configured maximum without seeing throttling
    CeilingReached { last_rate: u64, max_rate: u64 },
}

impl ProbeOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::LimitFound { .. } => 0,
            Self::CeilingReached { .. } => 3,
        }
    }
}

/// Runs trials at rising rates until throttling (or the ceiling) is hit
pub struct EscalationController<P> {
    prober: P,
    config: ProbeConfig,
    state: EscalationState,
    phase: ProbeState,
    trials_run: u64,
}

impl<P: Prober> EscalationController<P> {
    pub fn new(prober: P, config: ProbeConfig) -> Self {
        let state = EscalationState::new(config.start_rate, config.rate_step, config.max_rate);
        let phase = ProbeState::Probing(state.current_rate);
        Self {
            prober,
            config,
            state,
            phase,
            trials_run: 0,
        }
    }

    pub fn state(&self) -> &EscalationState {
        &self.state
    }

    pub fn phase(&self) -> ProbeState {
        self.phase
    }

    pub fn trials_run(&self) -> u64 {
        self.trials_run
    }

    /// Run trials until the search ends
    pub async fn run(&mut self) -> ProbeOutcome {
        println!(
            "{}",
            report::start_banner(&self.config.target_url, self.config.method)
        );
        if self.config.max_rate.is_none() {
            warn!("No maximum rate configured; escalation continues until the target throttles");
        }

        loop {
            if let Some(outcome) = self.step().await {
                return outcome;
            }
        }
    }

    /// Run one trial and act on its result.
    ///
    /// Returns `Some` once the search is over. On a clean trial this also
    /// sleeps through the cooldown before returning `None`.
    pub async fn step(&mut self) -> Option<ProbeOutcome> {
        let rate = self.state.current_rate;
        self.phase = ProbeState::Probing(rate);

        let trial = self.config.trial(rate);
        println!("{}", report::trial_header(rate, trial.trial_duration));
        info!(rate, "Starting trial");

        let result = self.prober.run_trial(&trial).await;
        self.trials_run += 1;
        println!("{}", report::trial_summary(&result));

        match decide(&self.state, &result) {
            Decision::Found { rate } => {
                self.state.found = true;
                self.phase = ProbeState::Found(rate);
                println!("{}", report::limit_found(rate, &result));
                info!(rate, "Rate limit found");
                Some(ProbeOutcome::LimitFound { rate, result })
            }
            Decision::Escalate { next_rate } => {
                self.phase = ProbeState::Escalating(rate);
                let cooldown = self.config.cooldown();
                println!("{}", report::cooldown_notice(rate, cooldown));
                tokio::time::sleep(cooldown).await;

                self.state.current_rate = next_rate;
                self.phase = ProbeState::Probing(next_rate);
                None
            }
            Decision::CeilingReached { last_rate } => {
                let max_rate = self.state.max_rate.unwrap_or(last_rate);
                println!("{}", report::ceiling_reached(last_rate, max_rate));
                info!(last_rate, max_rate, "Maximum rate reached without throttling");
                Some(ProbeOutcome::CeilingReached {
                    last_rate,
                    max_rate,
                })
            }
        }
    }
}
