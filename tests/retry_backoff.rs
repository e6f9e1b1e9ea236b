mod common;

use std::time::Duration;

use common::{RecordingSleeper, ScriptedTransport};
use newspulse_bot::service::news::{
    request_with_retry, HttpResponse, RetryError, RetryPolicy, TransportError,
};

const URL: &str = "https://gnews.test/api/v4/top-headlines";

#[tokio::test]
async fn rate_limit_sleeps_for_retry_after() {
    let transport = ScriptedTransport::new()
        .push(Ok(HttpResponse::new(429, "slow down").with_header("Retry-After", "3")))
        .respond(200, r#"{"articles": []}"#);
    let sleeper = RecordingSleeper::default();

    let resp = request_with_retry(&transport, &sleeper, URL, &[], &RetryPolicy::default())
        .await
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(transport.calls().len(), 2);
    assert_eq!(sleeper.delays(), vec![Duration::from_secs(3)]);
}

#[tokio::test]
async fn retry_after_is_capped() {
    let transport = ScriptedTransport::new()
        .push(Ok(HttpResponse::new(429, "").with_header("retry-after", "90")))
        .respond(200, "{}");
    let sleeper = RecordingSleeper::default();

    request_with_retry(&transport, &sleeper, URL, &[], &RetryPolicy::default())
        .await
        .unwrap();

    assert_eq!(sleeper.delays(), vec![Duration::from_secs(10)]);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let transport = ScriptedTransport::new()
        .respond(403, "forbidden")
        .respond(200, "{}");
    let sleeper = RecordingSleeper::default();

    let err = request_with_retry(&transport, &sleeper, URL, &[], &RetryPolicy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, RetryError::Status { status: 403, .. }));
    assert_eq!(transport.calls().len(), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn server_errors_back_off_then_succeed() {
    let transport = ScriptedTransport::new()
        .respond(503, "unavailable")
        .push(Err(TransportError("connection reset".to_string())))
        .respond(200, "{}");
    let sleeper = RecordingSleeper::default();

    let resp = request_with_retry(&transport, &sleeper, URL, &[], &RetryPolicy::default())
        .await
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}

#[tokio::test]
async fn exhausted_rate_limit_reports_attempts() {
    let transport = ScriptedTransport::new()
        .respond(429, "")
        .respond(429, "")
        .respond(429, "");
    let sleeper = RecordingSleeper::default();
    let policy = RetryPolicy {
        max_attempts: 3,
        ..RetryPolicy::default()
    };

    let err = request_with_retry(&transport, &sleeper, URL, &[], &policy)
        .await
        .unwrap_err();

    assert!(matches!(err, RetryError::RateLimited { attempts: 3 }));
    assert_eq!(err.status(), Some(429));
    // No sleep after the last attempt.
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
}
