//! Process-level behaviour of the binary

use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ratelimit-probe"))
}

#[test]
fn test_missing_url_prints_usage_and_exits_1() {
    let output = binary().output().expect("failed to run binary");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("URL parameter is required"));
    assert!(stdout.contains("Usage: ratelimit-probe -url <target-url>"));
    // No request was sent
    assert!(!stdout.contains("Testing rate"));
}

#[test]
fn test_empty_url_is_rejected() {
    let output = binary().args(["-url", ""]).output().expect("failed to run binary");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage:"));
}

#[test]
fn test_unknown_method_is_rejected() {
    let output = binary()
        .args(["-url", "http://127.0.0.1:1/", "-method", "DELETE"])
        .output()
        .expect("failed to run binary");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DELETE"));
    assert!(!stdout.contains("Testing rate"));
}

#[test]
fn test_invalid_config_value_exits_1() {
    let output = binary()
        .args(["-url", "http://127.0.0.1:1/", "--step", "0"])
        .output()
        .expect("failed to run binary");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("rate_step"));
}

#[cfg(unix)]
#[test]
fn test_sigint_stops_run_with_130() {
    use std::io::{BufRead, BufReader, Read};
    use std::process::Stdio;
    use std::time::Duration;

    let mut child = binary()
        .args([
            "-url",
            "http://127.0.0.1:1/",
            "--trial-duration",
            "5",
            "--request-timeout",
            "1",
            "--cooldown",
            "0",
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to run binary");

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut banner = String::new();
    stdout.read_line(&mut banner).unwrap();
    assert!(banner.starts_with("Starting rate limit detection"));

    // Give the runtime time to install its Ctrl-C handler
    std::thread::sleep(Duration::from_millis(500));
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(status.success());

    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    let exit = child.wait().unwrap();

    assert_eq!(exit.code(), Some(130));
    assert!(rest.contains("Interrupted while testing 5 req/s"));
}
