use std::fmt;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connect, DNS, reset, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The server answered with a non-success status; the body is kept verbatim.
    #[error("http {0}: {1}")]
    Http(StatusCode, String),
    #[error("session refresh failed: {0}")]
    RefreshFailed(RefreshFailure),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl Error {
    /// No response at all, or a 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Http(status, _) => status.is_server_error(),
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Http(StatusCode::UNAUTHORIZED, _))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(status, _) => Some(*status),
            Error::Network(err) => err.status(),
            Error::RefreshFailed(failure) => failure.status,
            _ => None,
        }
    }
}

/// Terminal outcome of a session renewal, handed to every request that
/// waited on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl RefreshFailure {
    pub fn new(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<&Error> for RefreshFailure {
    fn from(err: &Error) -> Self {
        match err {
            Error::RefreshFailed(failure) => failure.clone(),
            other => RefreshFailure::new(other.status(), other.to_string()),
        }
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}
