//! Validation tokens exchanged on state-changing requests.

use std::fmt;

/// Response header carrying a fresh validation token.
pub const VALIDATION_HEADER: &str = "X-Foswiki-Validation";

/// Marker placed before a token written back into the page. It tells a
/// [`TokenTransform`] that the key still needs to be processed.
pub const REFRESH_MARKER: char = '?';

/// An opaque anti-forgery token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationToken(String);

impl ValidationToken {
    /// Wrap a raw token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The token as sent to the server.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token prefixed with [`REFRESH_MARKER`], as stored in page fields.
    pub fn marked(&self) -> String {
        format!("{}{}", REFRESH_MARKER, self.0)
    }

    /// Apply a transform, if one is configured.
    pub fn transformed(self, transform: Option<&dyn TokenTransform>) -> Self {
        match transform {
            Some(t) => Self(t.transform(&self.0)),
            None => self,
        }
    }
}

impl fmt::Display for ValidationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ValidationToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Client-side processing of a token before it is sent.
///
/// Sites running a challenge/response scheme (such as StrikeOne) derive the
/// submitted key from the served one; install the matching transform on the
/// session. Without one, tokens are sent as served.
pub trait TokenTransform: Send + Sync {
    /// Derive the key to submit from the served key.
    fn transform(&self, key: &str) -> String;
}

impl<F> TokenTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transform(&self, key: &str) -> String {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marked() {
        assert_eq!(ValidationToken::new("abc").marked(), "?abc");
    }

    #[test]
    fn test_transform_is_optional() {
        let token = ValidationToken::new("?abc");
        assert_eq!(token.clone().transformed(None), token);

        let strip = |key: &str| key.trim_start_matches(REFRESH_MARKER).to_uppercase();
        let token = token.transformed(Some(&strip));
        assert_eq!(token.as_str(), "ABC");
    }
}
