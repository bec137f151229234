//! ratelimit-probe CLI
//!
//! ```bash
//! ratelimit-probe -url <target-url> [-method GET|POST] [-data 'key=value']
//! ```

use std::process;

use anyhow::Context;
use ratelimit_probe::cli::{Cli, USAGE};
use ratelimit_probe::{EscalationController, HttpProber, ProbeError};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "ratelimit_probe=debug"
    } else {
        "ratelimit_probe=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // stdout carries the report; logs go to stderr
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_normalized();
    init_logging(cli.verbose);

    let config = cli.into_config().unwrap_or_else(|e| fail(e));
    let prober = HttpProber::new().unwrap_or_else(|e| fail(e));
    let mut controller = EscalationController::new(prober, config);

    let interrupted = tokio::select! {
        outcome = controller.run() => process::exit(outcome.exit_code()),
        signal = tokio::signal::ctrl_c() => signal,
    };
    interrupted.context("Failed to listen for Ctrl-C")?;

    let rate = controller.state().current_rate;
    warn!(rate, "Interrupted");
    println!(
        "\nInterrupted while testing {} req/s; no rate limit observed yet",
        rate
    );
    process::exit(130);
}

/// Report a startup error on stdout and exit with its code
fn fail(e: ProbeError) -> ! {
    println!("Error: {}", e);
    if e.is_usage_error() {
        println!("{}", USAGE);
    }
    process::exit(e.exit_code());
}
