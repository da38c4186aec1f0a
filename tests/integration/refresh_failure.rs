use std::time::Duration;

use shopfront_http::{CredentialSlot, CredentialStore, Error};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::harness;

#[tokio::test]
async fn every_waiter_gets_the_refresh_error_and_credentials_are_wiped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_string("renewal revoked")
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), CredentialSlot::Persistent, "T1", "/repairs");
    h.store.set(CredentialSlot::Ephemeral, "leftover".into());

    let (a, b, c) = tokio::join!(
        h.client.get("/repairs"),
        h.client.get("/repairs/1"),
        h.client.get("/customers")
    );

    let failures: Vec<_> = [a, b, c]
        .into_iter()
        .map(|res| match res {
            Err(Error::RefreshFailed(failure)) => failure,
            other => panic!("expected RefreshFailed, got {:?}", other.map(|r| r.status())),
        })
        .collect();
    assert!(failures.iter().all(|f| f == &failures[0]));
    assert_eq!(failures[0].status.map(|s| s.as_u16()), Some(403));

    assert_eq!(h.store.get(CredentialSlot::Persistent), None);
    assert_eq!(h.store.get(CredentialSlot::Ephemeral), None);
    assert_eq!(h.navigator.redirects(), vec!["/login?expired=true".to_string()]);
}

#[tokio::test]
async fn unparsable_refresh_body_counts_as_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), CredentialSlot::Ephemeral, "T1", "/login");

    let err = h.client.get("/tickets").await.expect_err("refresh must fail");
    assert!(matches!(err, Error::RefreshFailed(_)), "got {:?}", err);
    assert!(h.store.current_token().is_none());
    assert!(
        h.navigator.redirects().is_empty(),
        "already on the login route, no redirect expected"
    );
}
