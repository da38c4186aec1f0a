use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::{Error, RefreshFailure};

/// One session renewal call returning a fresh access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self) -> Result<String, Error>;
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(rename = "accessToken", alias = "access_token", alias = "token")]
    access_token: String,
}

/// `POST {base}/auth/refresh` with no body. The renewal credential travels
/// out of band (a cookie held by the shared client's cookie store).
#[derive(Clone)]
pub struct HttpTokenRefresher {
    http: Client,
    url: Url,
    user_agent: String,
}

impl HttpTokenRefresher {
    pub fn new(http: Client, url: Url, user_agent: impl Into<String>) -> Self {
        Self {
            http,
            url,
            user_agent: user_agent.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self) -> Result<String, Error> {
        let resp = self
            .http
            .post(self.url.clone())
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            error!(status = %status, url = %self.url, "session refresh rejected");
            return Err(Error::Http(status, body));
        }
        let parsed: RefreshResponse = serde_json::from_str(&body)?;
        if parsed.access_token.is_empty() {
            return Err(Error::RefreshFailed(RefreshFailure::new(
                Some(status),
                "refresh response carried an empty access token",
            )));
        }
        info!(token_len = parsed.access_token.len(), "session refresh ok");
        Ok(parsed.access_token)
    }
}
