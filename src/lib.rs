//! Authenticated HTTP client core for the shopfront API.
//!
//! Every request goes through [`ApiClient::send`], which injects the bearer
//! token, tags writes with an `Idempotency-Key`, retries transient failures
//! with bounded backoff, and renews the session at most once per refresh
//! window no matter how many requests hit a 401 concurrently.

pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod idempotency;
pub mod interceptor;
pub mod refresh;
pub mod request;
pub mod retry;
pub mod telemetry;

pub use client::{ApiClient, ApiClientBuilder, Response};
pub use config::{ClientConfig, ConfigLocation, RetrySettings, read_config};
pub use credentials::{CredentialSlot, CredentialStore, MemoryCredentialStore};
pub use errors::{Error, RefreshFailure};
pub use request::{RequestAttempt, RequestConfig};
