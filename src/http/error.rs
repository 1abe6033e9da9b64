use thiserror::Error;

/// Failures talking to the progress service
#[derive(Debug, Error)]
pub enum ApiError {
    /// the service answered 401, the session is gone
    #[error("not authenticated")]
    Unauthenticated,

    #[error("unexpected response status {0}")]
    Status(u16),

    #[error("http request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid session cookie: {0}")]
    InvalidCookie(#[from] reqwest::header::InvalidHeaderValue),
}

impl ApiError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ApiError::Unauthenticated,
            other => ApiError::Status(other),
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }
}
