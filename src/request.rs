use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::errors::Error;

/// Per-call description of a request sent through [`crate::ApiClient`].
#[derive(Clone, Debug)]
pub struct RequestConfig {
    pub method: Method,
    /// Path relative to the client's base URL, or an absolute URL.
    pub path: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    idempotency_key: Option<String>,
    retry_disabled: bool,
}

impl RequestConfig {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            idempotency_key: None,
            retry_disabled: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Opts this call out of transient-failure retries.
    pub fn without_retry(mut self) -> Self {
        self.retry_disabled = true;
        self
    }

    /// Pins the idempotency key up front, e.g. when the caller replays a write
    /// it already attempted in an earlier session.
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.assign_idempotency_key(key.into());
        self
    }

    pub fn retry_disabled(&self) -> bool {
        self.retry_disabled
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    /// Sets the key only if none was assigned yet; returns the key in effect.
    pub(crate) fn assign_idempotency_key(&mut self, key: String) -> &str {
        self.idempotency_key.get_or_insert(key)
    }

    /// Token carried by the `Authorization` header of the last transmission.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    pub fn is_mutating(&self) -> bool {
        matches!(
            self.method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        )
    }

    /// `METHOD path`, used as the request label in logs.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// A request plus whether it has already been through a session refresh.
/// A second 401 on an attempt that was already refreshed is surfaced instead
/// of triggering another refresh.
#[derive(Clone, Debug)]
pub struct RequestAttempt {
    pub config: RequestConfig,
    already_refreshed: bool,
}

impl RequestAttempt {
    pub fn new(config: RequestConfig) -> Self {
        Self {
            config,
            already_refreshed: false,
        }
    }

    pub fn already_refreshed(&self) -> bool {
        self.already_refreshed
    }

    pub fn mark_refreshed(self) -> Self {
        Self {
            already_refreshed: true,
            ..self
        }
    }
}
