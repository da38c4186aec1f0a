use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::credentials::CredentialStore;
use crate::idempotency::IdempotencyKeys;
use crate::request::RequestConfig;

pub const IDEMPOTENCY_KEY: HeaderName = HeaderName::from_static("idempotency-key");

/// Prepares every outgoing request: bearer auth from the credential store and
/// an idempotency key for writes.
#[derive(Clone)]
pub struct RequestInterceptor {
    store: Arc<dyn CredentialStore>,
    keys: Arc<dyn IdempotencyKeys>,
}

impl RequestInterceptor {
    pub fn new(store: Arc<dyn CredentialStore>, keys: Arc<dyn IdempotencyKeys>) -> Self {
        Self { store, keys }
    }

    /// Mutates `config` in place. Runs before each transmission, so a replay
    /// picks up whatever token the store holds at that moment while the
    /// idempotency key stays fixed.
    pub fn apply(&self, config: &mut RequestConfig) {
        match self.store.current_token().and_then(|token| bearer(&token)) {
            Some(value) => {
                config.headers.insert(AUTHORIZATION, value);
            }
            None => {
                config.headers.remove(AUTHORIZATION);
            }
        }

        if config.is_mutating() && config.idempotency_key().is_none() {
            let key = config.assign_idempotency_key(self.keys.next_key()).to_string();
            debug!(request = %config.label(), key = %key, "idempotency.assigned");
        }
        match config.idempotency_key().map(HeaderValue::from_str) {
            Some(Ok(value)) => {
                config.headers.insert(IDEMPOTENCY_KEY, value);
            }
            Some(Err(_)) => {
                warn!(request = %config.label(), "idempotency key is not a valid header value")
            }
            None => {}
        }
    }
}

fn bearer(token: &str) -> Option<HeaderValue> {
    match HeaderValue::from_str(&format!("Bearer {}", token)) {
        Ok(mut value) => {
            value.set_sensitive(true);
            Some(value)
        }
        Err(_) => {
            warn!(len = token.len(), "stored token is not a valid header value; sending anonymously");
            None
        }
    }
}
