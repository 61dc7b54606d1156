//! CMS error types

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("no {doc_type} document with uid `{uid}`")]
    NotFound { doc_type: String, uid: String },
    #[error("upstream error: status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// What the caller should do about an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Render a not-found page
    NotFound,
    /// Render a retry affordance
    Upstream,
}

impl CmsError {
    pub fn malformed(err: impl std::fmt::Display) -> Self {
        Self::MalformedResponse(err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CmsError::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Upstream,
        }
    }

    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            CmsError::Upstream { status, .. } => *status >= 500 || *status == 429,
            CmsError::Http(e) => !e.is_decode() && !e.is_builder(),
            CmsError::Timeout(_) => true,
            CmsError::NotFound { .. }
            | CmsError::MalformedResponse(_)
            | CmsError::InvalidUrl(_) => false,
        }
    }
}
