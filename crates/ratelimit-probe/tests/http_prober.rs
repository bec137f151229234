//! Integration tests for the HTTP prober against mock servers
//!
//! Trials here are shortened (2s, one request per worker every 500ms) so the
//! suite stays quick while still exercising real sockets.

use std::time::Duration;

use ratelimit_probe::prober::FORM_CONTENT_TYPE;
use ratelimit_probe::{HttpMethod, HttpProber, Prober, TrialConfig};
use wiremock::matchers::{any, body_string, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn short_trial(url: String, workers: u64) -> TrialConfig {
    TrialConfig {
        target_url: url,
        method: HttpMethod::Get,
        body: None,
        worker_count: workers,
        trial_duration: Duration::from_secs(2),
        request_interval: Duration::from_millis(500),
        request_timeout: Duration::from_secs(1),
    }
}

async fn server_answering(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

mod classification {
    use super::*;

    #[tokio::test]
    async fn test_ok_responses_count_as_success() {
        let server = server_answering(200).await;
        let trial = short_trial(server.uri(), 3);

        let result = HttpProber::new().unwrap().run_trial(&trial).await;

        assert!(result.total_requests() > 0);
        assert_eq!(result.success_count, result.total_requests());
        assert_eq!(result.throttled_count, 0);
        assert_eq!(result.other_error_count, 0);
        assert!(!result.is_throttled());
    }

    #[tokio::test]
    async fn test_429_responses_count_as_throttled() {
        let server = server_answering(429).await;
        let trial = short_trial(server.uri(), 2);

        let result = HttpProber::new().unwrap().run_trial(&trial).await;

        assert!(result.is_throttled());
        assert_eq!(result.throttled_count, result.total_requests());
        assert_eq!(result.success_count, 0);
    }

    #[tokio::test]
    async fn test_server_errors_count_as_other() {
        let server = server_answering(500).await;
        let trial = short_trial(server.uri(), 2);

        let result = HttpProber::new().unwrap().run_trial(&trial).await;

        assert!(result.total_requests() > 0);
        assert_eq!(result.other_error_count, result.total_requests());
        assert!(!result.is_throttled());
    }

    #[tokio::test]
    async fn test_slow_responses_time_out_as_other() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1500)))
            .mount(&server)
            .await;
        let trial = short_trial(server.uri(), 2);

        let result = HttpProber::new().unwrap().run_trial(&trial).await;

        assert!(result.total_requests() > 0);
        assert_eq!(result.success_count, 0);
        assert_eq!(result.other_error_count, result.total_requests());
        // A hung request is capped by its own timeout, not the trial
        let cap = trial.trial_duration + trial.request_timeout + Duration::from_secs(1);
        assert!(result.observed_duration < cap);
    }
}

mod pacing {
    use super::*;

    #[tokio::test]
    async fn test_total_bounded_by_workers_times_ticks() {
        let server = server_answering(200).await;
        let trial = short_trial(server.uri(), 5);

        let result = HttpProber::new().unwrap().run_trial(&trial).await;

        assert!(result.total_requests() <= trial.max_requests());
        assert_eq!(
            result.success_count + result.throttled_count + result.other_error_count,
            result.total_requests()
        );

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len() as u64, result.total_requests());
    }

    #[tokio::test]
    async fn test_trial_runs_full_duration_even_when_throttled() {
        let server = server_answering(429).await;
        let trial = short_trial(server.uri(), 2);

        let result = HttpProber::new().unwrap().run_trial(&trial).await;

        assert!(result.is_throttled());
        assert!(result.observed_duration >= trial.trial_duration);
        // Every worker kept firing after its first 429
        assert!(result.throttled_count > trial.worker_count);
    }
}

mod wire_format {
    use super::*;

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("content-type", FORM_CONTENT_TYPE))
            .and(body_string("key=value"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let trial = TrialConfig {
            method: HttpMethod::Post,
            body: Some("key=value".to_string()),
            ..short_trial(server.uri(), 2)
        };

        let result = HttpProber::new().unwrap().run_trial(&trial).await;

        // Anything not matching the mock gets a 404 and would count as other
        assert!(result.total_requests() > 0);
        assert_eq!(result.success_count, result.total_requests());

        for request in server.received_requests().await.unwrap() {
            assert_eq!(request.body, b"key=value");
            assert_eq!(
                request.headers.get("content-type").unwrap().to_str().unwrap(),
                FORM_CONTENT_TYPE
            );
        }
    }

    #[tokio::test]
    async fn test_get_sends_no_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let trial = short_trial(server.uri(), 1);
        let prober = HttpProber::with_client(reqwest::Client::new());
        let result = prober.run_trial(&trial).await;

        assert_eq!(result.success_count, result.total_requests());
        for request in server.received_requests().await.unwrap() {
            assert!(request.body.is_empty());
            assert!(request.headers.get("content-type").is_none());
        }
    }
}
