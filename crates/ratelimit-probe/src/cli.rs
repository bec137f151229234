//! Command-line arguments
//!
//! Flags can be written Go-style with a single dash (`-url`, `-method`,
//! `-data`) as well as with the usual double dash.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::ProbeConfig;
use crate::error::Result;
use crate::trial::HttpMethod;

/// Usage line printed when no target is given
pub const USAGE: &str =
    "Usage: ratelimit-probe -url <target-url> [-method GET|POST] [-data 'key=value']";

/// Long flags that may also be written with a single dash
const LONG_FLAGS: &[&str] = &[
    "url",
    "method",
    "data",
    "config",
    "start-rate",
    "step",
    "trial-duration",
    "interval-ms",
    "request-timeout",
    "cooldown",
    "max-rate",
    "verbose",
];

#[derive(Parser, Debug)]
#[command(name = "ratelimit-probe")]
#[command(version)]
#[command(about = "Find the request rate at which an HTTP endpoint starts answering 429", long_about = None)]
pub struct Cli {
    /// Target URL to test for rate limiting
    #[arg(long)]
    pub url: Option<String>,

    /// HTTP method to use: GET or POST
    #[arg(long)]
    pub method: Option<String>,

    /// POST data to send (used only if method is POST)
    #[arg(long)]
    pub data: Option<String>,

    /// TOML file with probe settings; flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rate of the first trial (req/s)
    #[arg(long)]
    pub start_rate: Option<u64>,

    /// Rate increase between trials (req/s)
    #[arg(long)]
    pub step: Option<u64>,

    /// Trial duration in seconds
    #[arg(long)]
    pub trial_duration: Option<u64>,

    /// Interval between requests of one worker, in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Pause between trials in seconds
    #[arg(long)]
    pub cooldown: Option<u64>,

    /// Do not escalate past this rate
    #[arg(long)]
    pub max_rate: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long flags
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Merge defaults, the config file and flags into a validated config
    pub fn into_config(self) -> Result<ProbeConfig> {
        let mut config = match &self.config {
            Some(path) => ProbeConfig::load(path)?,
            None => ProbeConfig::default(),
        };

        if let Some(url) = self.url {
            config.target_url = url;
        }
        if let Some(method) = self.method {
            config.method = method.parse::<HttpMethod>()?;
        }
        if let Some(data) = self.data {
            config.body = Some(data);
        }
        if let Some(rate) = self.start_rate {
            config.start_rate = rate;
        }
        if let Some(step) = self.step {
            config.rate_step = step;
        }
        if let Some(secs) = self.trial_duration {
            config.trial_duration_secs = secs;
        }
        if let Some(ms) = self.interval_ms {
            config.request_interval_ms = ms;
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout_secs = secs;
        }
        if let Some(secs) = self.cooldown {
            config.cooldown_secs = secs;
        }
        if self.max_rate.is_some() {
            config.max_rate = self.max_rate;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Rewrite `-url x` / `-url=x` into `--url x` / `--url=x`.
///
/// Only known long flags are rewritten; anything after `--` is left alone.
/// The argument following a value-taking flag is always that flag's value,
/// even when it starts with a dash (`-data -x=1` sends `-x=1` as the body);
/// such values are glued on as `--data=-x=1` so clap does not read them as
/// flags.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut out: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        if arg == "--" {
            out.push(arg);
            out.extend(args.by_ref());
            break;
        }

        let Some((name, flag)) = arg.to_str().and_then(long_flag) else {
            out.push(arg);
            continue;
        };

        let expects_value = name != "verbose" && !flag.contains('=');
        if !expects_value {
            out.push(flag.into());
            continue;
        }

        match args.next() {
            Some(value) if value.to_str().is_some_and(|v| v.starts_with('-')) => {
                let mut joined = OsString::from(format!("{}=", flag));
                joined.push(&value);
                out.push(joined);
            }
            Some(value) => {
                out.push(flag.into());
                out.push(value);
            }
            None => out.push(flag.into()),
        }
    }

    out
}

/// Match a known long flag, returning its name and its `--` spelling
fn long_flag(arg: &str) -> Option<(&'static str, String)> {
    let rest = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'))?;
    let name = rest.split('=').next().unwrap_or(rest);
    let known = LONG_FLAGS.iter().copied().find(|flag| *flag == name)?;
    Some((known, format!("--{}", rest)))
}
