//! Error taxonomy for everything that talks to the server.
//!
//! The poller relies on [`ApiError::NotFound`] being distinguishable from
//! transient failures: a missing session is terminal and never retried,
//! while transient failures are retried with backoff.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of an API operation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The session does not exist on the server (deleted or never created).
    #[error("session not found")]
    NotFound,

    /// A network or server error that may succeed on retry.
    #[error("request failed: {0}")]
    Transient(String),

    /// The caller is not authorized for this operation.
    #[error("not authorized")]
    Unauthorized,

    /// The server answered with something we could not decode.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    pub(crate) fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
            other => ApiError::Transient(format!("unexpected status {other}")),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transient(err.to_string())
        }
    }
}
