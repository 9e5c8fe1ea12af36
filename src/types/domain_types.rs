//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Bearer token for Lark Open API authentication
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Create a new bearer token with validation
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = token.into().trim().to_string();

        if token.is_empty() {
            return Err(ValidationError::InvalidToken {
                reason: "Bearer token cannot be empty".to_string(),
            });
        }

        if token.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidToken {
                reason: "Bearer token must not contain whitespace".to_string(),
            });
        }

        Ok(Self(token))
    }

    /// Get the token as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact token in display
        let visible: String = self.0.chars().take(10).collect();
        write!(f, "{}...", visible)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken({})", self)
    }
}

/// Base URL under which stored media files are served.
///
/// Rendered image references are `<base>/<filename>`. Holds the
/// serialized form of an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBaseUrl(String);

impl MediaBaseUrl {
    /// Parse and validate a base URL string
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let url = Url::parse(s).map_err(|e| ValidationError::InvalidUrl {
            url: s.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self(url.into())),
            scheme => Err(ValidationError::InvalidUrl {
                url: s.to_string(),
                reason: format!("unsupported scheme '{}'", scheme),
            }),
        }
    }

    /// Builds the public URL of a stored media file.
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/{}", self.0.trim_end_matches('/'), filename)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for MediaBaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MediaBaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MediaBaseUrl::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Default for MediaBaseUrl {
    fn default() -> Self {
        Self(crate::constants::DEFAULT_MEDIA_BASE_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_validation() {
        assert!(BearerToken::new("").is_err());
        assert!(BearerToken::new("u-abc def").is_err());
        let token = BearerToken::new("  u-1234567890abcdef  ").unwrap();
        assert_eq!(token.as_str(), "u-1234567890abcdef");
        assert_eq!(token.to_string(), "u-12345678...");
    }

    #[test]
    fn test_media_base_url_joins_filename() {
        let base = MediaBaseUrl::parse("http://localhost:48080/static/").unwrap();
        assert_eq!(
            base.file_url("abc.png"),
            "http://localhost:48080/static/abc.png"
        );
        assert!(MediaBaseUrl::parse("ftp://example.com").is_err());
        assert!(MediaBaseUrl::parse("not a url").is_err());
    }

    #[test]
    fn test_default_media_base_url_is_valid() {
        let parsed = MediaBaseUrl::parse(crate::constants::DEFAULT_MEDIA_BASE_URL).unwrap();
        assert_eq!(MediaBaseUrl::default(), parsed);
        assert_eq!(
            MediaBaseUrl::default().file_url("x.png"),
            "http://localhost:48080/static/x.png"
        );
    }
}
