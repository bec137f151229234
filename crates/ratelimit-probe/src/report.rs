//! Human-readable progress and result lines written to stdout.
//!
//! The wording is for people, not scripts; nothing here is a stable format.

use std::time::Duration;

use crate::trial::{HttpMethod, TrialResult};

pub fn start_banner(target_url: &str, method: HttpMethod) -> String {
    format!("Starting rate limit detection for {} using {}", target_url, method)
}

pub fn trial_header(rate: u64, duration: Duration) -> String {
    format!("Testing rate: {} req/s for {:?}", rate, duration)
}

pub fn trial_summary(result: &TrialResult) -> String {
    format!(
        "Results: {} total requests ({:.1} req/s actual rate)\n  Success: {}, Rate Limited: {}, Other Errors: {}",
        result.total_requests(),
        result.achieved_rate(),
        result.success_count,
        result.throttled_count,
        result.other_error_count
    )
}

pub fn cooldown_notice(rate: u64, cooldown: Duration) -> String {
    format!(
        "No rate limit detected at {} req/s. Waiting {:?} before next test...\n",
        rate, cooldown
    )
}

/// Final report once throttling has been seen
pub fn limit_found(rate: u64, result: &TrialResult) -> String {
    [
        String::new(),
        format!(
            "Rate limit found at approximately {} requests per second",
            rate
        ),
        format!("  Successful requests before limit: {}", result.success_count),
        format!("  Rate-limited requests:            {}", result.throttled_count),
        format!("  Other errors:                     {}", result.other_error_count),
        format!("  Achieved rate:                    {:.1} req/s", result.achieved_rate()),
    ]
    .join("\n")
}

pub fn ceiling_reached(last_rate: u64, max_rate: u64) -> String {
    format!(
        "\nNo rate limit detected up to {} req/s (maximum rate {} req/s reached)",
        last_rate, max_rate
    )
}
