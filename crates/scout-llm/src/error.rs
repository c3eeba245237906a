//! Failures at the language-model boundary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Transport failure before any response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API key rejected")]
    Unauthorized,

    /// HTTP 429, usually the free-tier quota
    #[error("quota exhausted: {0}")]
    RateLimited(String),

    #[error("request rejected: {0}")]
    BadRequest(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Any other non-2xx status
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Body parsed but had no usable candidate
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Safety or recitation stop
    #[error("response blocked by provider: {0}")]
    Blocked(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl LLMError {
    /// Map a failed HTTP status to the matching variant
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            429 => Self::RateLimited(body),
            400 => Self::BadRequest(body),
            404 => Self::UnknownModel(model.to_string()),
            _ => Self::Status { status, body },
        }
    }

    /// Worth retrying later without changing the request
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
