//! Tolkr error types

/// Tolkr error types.
///
/// Every variant is `Clone`: session acquisition runs behind a shared
/// in-flight future, so a single failure may be handed to several
/// concurrent callers.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TolkrError {
    /// The session id could not be located in the scraped front page.
    ///
    /// Terminal — this means the remote page format changed and retrying
    /// without a client update will not help.
    #[error("session id not found in page")]
    SidParse,

    /// Non-success response from the translation API.
    ///
    /// Carries the raw response body for diagnostics.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(String),

    #[error("empty response from translation API")]
    EmptyResponse,

    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for TolkrError {
    fn from(err: reqwest::Error) -> Self {
        TolkrError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for TolkrError {
    fn from(err: serde_json::Error) -> Self {
        TolkrError::Json(err.to_string())
    }
}

/// Result type alias for tolkr operations
pub type Result<T> = std::result::Result<T, TolkrError>;
