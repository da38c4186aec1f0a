use shopfront_http::{CredentialSlot, CredentialStore, Error};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::harness;

#[tokio::test]
async fn second_401_after_refresh_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/promotions/9"))
        .respond_with(ResponseTemplate::new(401).set_body_string("insufficient role"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "accessToken": "T2" })))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), CredentialSlot::Persistent, "T1", "/promotions");

    let err = h
        .client
        .delete("/promotions/9")
        .await
        .expect_err("second 401 must surface");
    assert!(err.is_unauthorized(), "got {:?}", err);
    assert!(h.navigator.redirects().is_empty());
    assert_eq!(h.store.get(CredentialSlot::Persistent).as_deref(), Some("T2"));
}

#[tokio::test]
async fn other_4xx_is_returned_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sales"))
        .respond_with(ResponseTemplate::new(422).set_body_string("{\"error\":\"out of stock\"}"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server.uri(), CredentialSlot::Persistent, "T1", "/pos");

    match h.client.post_json("/sales", &serde_json::json!({ "sku": "X" })).await {
        Err(Error::Http(status, body)) => {
            assert_eq!(status.as_u16(), 422);
            assert_eq!(body, "{\"error\":\"out of stock\"}");
        }
        other => panic!("expected 422, got {:?}", other.map(|r| r.status())),
    }
}
