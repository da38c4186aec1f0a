use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    ApiClient,
    client::Response,
    credentials::CredentialSlot,
    errors::Error,
    request::{RequestAttempt, RequestConfig},
};

impl ApiClient {
    /// Sends one logical request.
    ///
    /// Transient failures (no response, 5xx) are retried with backoff. A 401
    /// renews the session once, joining any renewal already in flight, and
    /// replays the request with the new token; a second 401 is returned as is.
    /// If the rejected token was already replaced by a renewal that settled
    /// meanwhile, the replay uses the stored token without a new renewal.
    /// Every other failure comes back unchanged.
    pub async fn send(&self, config: RequestConfig) -> Result<Response, Error> {
        let mut attempt = RequestAttempt::new(config);
        loop {
            match self.dispatch(&mut attempt.config).await {
                Err(err) if err.is_unauthorized() && !attempt.already_refreshed() => {
                    warn!(
                        request = %attempt.config.label(),
                        "request.unauthorized 401, renewing session"
                    );
                    self.refresh
                        .renew_after(attempt.config.bearer_token())
                        .await?;
                    attempt = attempt.mark_refreshed();
                }
                Err(err) if err.is_unauthorized() => {
                    warn!(
                        request = %attempt.config.label(),
                        "request.unauthorized 401 after session renewal"
                    );
                    return Err(err);
                }
                other => return other,
            }
        }
    }

    pub async fn send_json<T: DeserializeOwned>(&self, config: RequestConfig) -> Result<T, Error> {
        self.send(config).await?.json()
    }

    pub async fn get(&self, path: &str) -> Result<Response, Error> {
        self.send(RequestConfig::get(path)).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, Error> {
        self.send(RequestConfig::post(path).json(body)?).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, Error> {
        self.send(RequestConfig::put(path).json(body)?).await
    }

    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, Error> {
        self.send(RequestConfig::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, Error> {
        self.send(RequestConfig::delete(path)).await
    }

    /// Stores the token from a login call. `remember` picks the persistent
    /// slot; the other slot is cleared so only one holds a token.
    pub fn sign_in(&self, token: impl Into<String>, remember: bool) {
        let (slot, other) = if remember {
            (CredentialSlot::Persistent, CredentialSlot::Ephemeral)
        } else {
            (CredentialSlot::Ephemeral, CredentialSlot::Persistent)
        };
        self.store.clear(other);
        self.store.set(slot, token.into());
    }

    pub fn sign_out(&self) {
        self.store.clear_all();
    }

    /// One pass through the retry loop. The interceptor runs before every
    /// transmission on the same config, so the idempotency key is reused.
    async fn dispatch(&self, config: &mut RequestConfig) -> Result<Response, Error> {
        let label = config.label();
        let allow_retry = !config.retry_disabled();
        let (response, _outcome) = self
            .retry
            .execute(&label, allow_retry, |attempt| {
                self.interceptor.apply(config);
                let request = self.build_request(config);
                let label = label.clone();
                async move { transmit(request?, &label, attempt).await }
            })
            .await?;
        Ok(response)
    }

    fn build_request(&self, config: &RequestConfig) -> Result<RequestBuilder, Error> {
        let url = self.resolve(&config.path)?;
        let mut builder = self
            .http
            .request(config.method.clone(), url)
            .headers(config.headers.clone());
        if !config.query.is_empty() {
            builder = builder.query(&config.query);
        }
        if let Some(body) = &config.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }
}

async fn transmit(request: RequestBuilder, label: &str, attempt: u8) -> Result<Response, Error> {
    let resp = request.send().await?;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.bytes().await?.to_vec();

    if status.is_success() || status.is_redirection() {
        debug!(request = %label, status = %status, attempt, "request.sent");
        Ok(Response::new(status, headers, body))
    } else {
        let text = String::from_utf8_lossy(&body).into_owned();
        warn!(request = %label, status = %status, attempt, "request.failed");
        Err(Error::Http(status, text))
    }
}
