use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use shopfront_http::errors::Error;
use shopfront_http::retry::{JitterStrategy, RetryCoordinator, RetryPlan};

fn coordinator(max_attempts: u8) -> RetryCoordinator {
    RetryCoordinator::new(
        RetryPlan::new(
            max_attempts,
            Duration::from_millis(5),
            1.5,
            Duration::from_millis(20),
            JitterStrategy::None,
        )
        .expect("valid plan"),
    )
}

#[tokio::test(flavor = "current_thread")]
async fn request_send_contract_surfaces_503_after_retries() {
    let calls = AtomicU8::new(0);
    let err = coordinator(4)
        .execute("GET /reports", true, |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(Error::Http(
                    reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    "maintenance".into(),
                ))
            }
        })
        .await
        .expect_err("request should surface the 503");

    match err {
        Error::Http(status, body) => {
            assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
            assert!(body.contains("maintenance"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(flavor = "current_thread")]
async fn request_send_contract_does_not_retry_401() {
    let calls = AtomicU8::new(0);
    let err = coordinator(4)
        .execute("GET /me", true, |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(Error::Http(reqwest::StatusCode::UNAUTHORIZED, String::new()))
            }
        })
        .await
        .expect_err("401 goes to the refresh path");
    assert!(err.is_unauthorized());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn request_send_contract_reports_attempts() {
    let (value, outcome) = coordinator(4)
        .execute("POST /sales", true, |attempt| async move {
            if attempt < 3 {
                Err(Error::Http(reqwest::StatusCode::BAD_GATEWAY, String::new()))
            } else {
                Ok(attempt)
            }
        })
        .await
        .expect("third attempt succeeds");
    assert_eq!(value, 3);
    assert_eq!(outcome.attempts, 3);
    assert!(outcome.success);
    assert_eq!(outcome.request, "POST /sales");
}

#[tokio::test(flavor = "current_thread")]
async fn request_send_contract_honours_opt_out() {
    let calls = AtomicU8::new(0);
    coordinator(4)
        .execute("POST /payments", false, |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(Error::Http(reqwest::StatusCode::BAD_GATEWAY, String::new())) }
        })
        .await
        .expect_err("single attempt");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn request_send_contract_survives_long_outage_with_steep_backoff() {
    let coordinator = RetryCoordinator::new(
        RetryPlan::new(
            40,
            Duration::from_millis(250),
            10.0,
            Duration::from_secs(5),
            JitterStrategy::Bounded,
        )
        .expect("valid plan"),
    );
    let calls = AtomicU8::new(0);
    let err = coordinator
        .execute("GET /stock", true, |_attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(Error::Http(
                    reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    String::new(),
                ))
            }
        })
        .await
        .expect_err("outage outlasts every attempt");
    assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
    assert_eq!(calls.load(Ordering::SeqCst), 40);
}
