use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use shopfront_http::{ApiClient, ClientConfig, Error, RetrySettings};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(uri: &str) -> ClientConfig {
    ClientConfig::from_values(uri).with_retry(RetrySettings {
        max_attempts: 4,
        initial_delay_ms: 50,
        multiplier: 2.0,
        max_delay_ms: 1_000,
        jitter: "none".into(),
    })
}

#[tokio::test]
async fn always_503_is_attempted_four_times_with_growing_gaps() {
    let server = MockServer::start().await;
    let arrivals: Arc<Mutex<Vec<Instant>>> = Arc::new(Mutex::new(Vec::new()));
    let arrivals_clone = arrivals.clone();

    Mock::given(method("GET"))
        .and(path("/reports/daily"))
        .respond_with(move |_req: &wiremock::Request| {
            arrivals_clone.lock().unwrap().push(Instant::now());
            ResponseTemplate::new(503).set_body_string("warming up")
        })
        .expect(4)
        .mount(&server)
        .await;

    let client = ApiClient::new(config(&server.uri())).expect("client");
    let err = client
        .get("/reports/daily")
        .await
        .expect_err("503 should surface after retries");

    match err {
        Error::Http(status, body) => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "warming up");
        }
        other => panic!("expected Http(503), got {:?}", other),
    }

    let arrivals = arrivals.lock().unwrap();
    assert_eq!(arrivals.len(), 4);
    let gaps: Vec<Duration> = arrivals.windows(2).map(|w| w[1] - w[0]).collect();
    for (gap, planned) in gaps.iter().zip([50u64, 100, 200]) {
        assert!(
            *gap >= Duration::from_millis(planned),
            "gap {:?} shorter than planned {}ms",
            gap,
            planned
        );
    }
    assert!(gaps.windows(2).all(|w| w[1] > w[0]), "gaps not increasing: {:?}", gaps);
}

#[tokio::test]
async fn connection_refused_is_retried_then_surfaced() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr")
    };

    let client = ApiClient::new(config(&format!("http://{}", addr))).expect("client");
    let started = Instant::now();
    let err = client
        .get("/customers")
        .await
        .expect_err("nothing listens on the port");

    assert!(matches!(err, Error::Network(_)), "got {:?}", err);
    assert!(err.is_transient());
    assert!(started.elapsed() >= Duration::from_millis(350));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/customers/unknown"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(config(&server.uri())).expect("client");
    let err = client
        .get("/customers/unknown")
        .await
        .expect_err("404 should surface");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(!err.is_transient());
}
