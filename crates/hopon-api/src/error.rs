//! Error types for the HTTP layer.

/// Errors raised while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The configured base URL doesn't parse.
    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The configured base URL parses but can't serve as a base for
    /// endpoint paths (e.g. a `mailto:` URL).
    #[error("API base URL cannot be used as a base: {0}")]
    NotABase(String),

    /// The request never produced a usable response: connection refused,
    /// DNS failure, timeout, or an unreadable body.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status. The message is the
    /// backend's response body, passed through verbatim so callers can
    /// show it to the user.
    #[error("API {status}: {message}")]
    Backend { status: u16, message: String },
}

impl ApiError {
    /// `true` if this is a backend `401 Unauthorized` response.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Backend { status: 401, .. })
    }
}
