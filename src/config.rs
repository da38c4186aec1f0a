//! read client configuration from a file or the environment

use std::time::Duration;

use serde::Deserialize;

use crate::errors::Error;
use crate::retry::{JitterStrategy, RetryPlan};

pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
pub const DEFAULT_USER_AGENT: &str = "shopfront-http/0.1.0";

pub enum ConfigLocation {
    File(String),
    Env,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_login_route")]
    pub login_route: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request transport timeout. Unset means the transport default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Serializable form of [`RetryPlan`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u8,
    pub initial_delay_ms: u64,
    pub multiplier: f32,
    pub max_delay_ms: u64,
    pub jitter: String,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let plan = RetryPlan::default_plan();
        Self {
            max_attempts: plan.max_attempts,
            initial_delay_ms: plan.initial_delay.as_millis() as u64,
            multiplier: plan.multiplier,
            max_delay_ms: plan.max_delay.as_millis() as u64,
            jitter: String::from("none"),
        }
    }
}

impl RetrySettings {
    pub fn to_plan(&self) -> Result<RetryPlan, Error> {
        let jitter: JitterStrategy = self.jitter.parse()?;
        RetryPlan::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            self.multiplier,
            Duration::from_millis(self.max_delay_ms),
            jitter,
        )
    }
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_login_route() -> String {
    DEFAULT_LOGIN_ROUTE.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    pub fn from_values(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            refresh_path: default_refresh_path(),
            login_route: default_login_route(),
            user_agent: default_user_agent(),
            timeout_secs: None,
            retry: RetrySettings::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetrySettings) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// # ENV Vars
    /// * `SHOPFRONT_API_URL` - base URL of the API (required)
    /// * `SHOPFRONT_REFRESH_PATH` - session renewal path, defaults to `/auth/refresh`
    /// * `SHOPFRONT_LOGIN_ROUTE` - route to send the user to on session loss
    /// * `SHOPFRONT_MAX_ATTEMPTS` - total attempts for transient failures
    /// * `SHOPFRONT_RETRY_JITTER` - `none` or `bounded`
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("SHOPFRONT_API_URL")
            .map_err(|_| Error::Config("Missing SHOPFRONT_API_URL env var".to_string()))?;
        let mut config = Self::from_values(base_url);
        if let Ok(path) = std::env::var("SHOPFRONT_REFRESH_PATH") {
            config.refresh_path = path;
        }
        if let Ok(route) = std::env::var("SHOPFRONT_LOGIN_ROUTE") {
            config.login_route = route;
        }
        if let Ok(attempts) = std::env::var("SHOPFRONT_MAX_ATTEMPTS") {
            config.retry.max_attempts = attempts.parse().map_err(|_| {
                Error::Config(format!(
                    "SHOPFRONT_MAX_ATTEMPTS must be a small integer, got '{}'",
                    attempts
                ))
            })?;
        }
        if let Ok(jitter) = std::env::var("SHOPFRONT_RETRY_JITTER") {
            config.retry.jitter = jitter;
        }
        Ok(config)
    }

    /// Base URL with a scheme and without a trailing slash.
    pub fn normalized_base_url(&self) -> Result<reqwest::Url, Error> {
        let has_scheme =
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://");
        let base = if has_scheme {
            self.base_url.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.base_url.trim_end_matches('/'))
        };
        reqwest::Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn read_config(loc: ConfigLocation) -> Result<ClientConfig, Error> {
    match loc {
        ConfigLocation::File(path) => ClientConfig::from_file(path),
        ConfigLocation::Env => ClientConfig::from_env(),
    }
}
