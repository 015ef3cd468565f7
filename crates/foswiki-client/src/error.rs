//! Client error types.

use reqwest::header::HeaderMap;
use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server returned a non-success response.
    ///
    /// The body and headers are kept exactly as received so callers can
    /// inspect whatever the server sent.
    #[error("API error ({status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response headers.
        headers: HeaderMap,
        /// Raw response body.
        body: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of a server error response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if the server asked for the action to be confirmed.
    pub fn is_confirmation_required(&self) -> bool {
        self.status() == Some(crate::forms::CONFIRMATION_REQUIRED)
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> Error {
        Error::Api {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    #[test]
    fn test_status_predicates() {
        assert!(api(404).is_not_found());
        assert!(api(419).is_confirmation_required());
        assert!(api(503).is_server_error());
        assert!(!api(400).is_server_error());
        assert_eq!(Error::Config("x".into()).status(), None);
    }
}
