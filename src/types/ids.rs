// src/types/ids.rs
use super::ValidationError;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use url::Url;

/// Strong typing for IDs with phantom types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockMarker;

/// Type aliases for specific ID types
pub type DocumentId = Id<DocumentMarker>;
pub type BlockId = Id<BlockMarker>;

impl<T> Id<T> {
    /// Creates an ID, rejecting blank input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        Ok(Self::from_raw(trimmed.to_string()))
    }

    /// Create an ID from a string already known to be valid (internal use)
    pub(crate) fn from_raw(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl DocumentId {
    /// Parses the document ID out of a document URL.
    pub fn from_url(url: &str) -> Result<Self, ValidationError> {
        let id = extract_document_id(url);
        if id.is_empty() {
            return Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: "Could not extract document ID from URL".to_string(),
            });
        }
        Ok(Self::from_raw(id))
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_raw(value))
    }
}

/// Opaque identifier of an externally hosted resource (image, sheet, board).
///
/// Tokens are looked up, never decoded; equality is plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceToken(String);

impl ResourceToken {
    /// Returns `None` for blank tokens, which are skipped everywhere.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines.
    pub fn preview(&self) -> &str {
        match self.0.char_indices().nth(20) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ResourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the document ID from a document URL.
///
/// The ID is the last non-empty path segment, percent-decoded and trimmed.
/// Query strings and fragments are ignored. Input that does not parse as an
/// absolute URL falls back to naive slash splitting.
pub fn extract_document_id(input: &str) -> String {
    let input = input.trim();

    let raw_segment = match Url::parse(input) {
        Ok(url) => url
            .path()
            .trim_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string(),
        Err(_) => {
            let without_query = input.split(['?', '#']).next().unwrap_or_default();
            without_query
                .split('/')
                .filter(|part| !part.is_empty())
                .next_back()
                .unwrap_or_default()
                .to_string()
        }
    };

    percent_decode_str(&raw_segment)
        .decode_utf8_lossy()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_ignores_query_and_fragment() {
        assert_eq!(
            extract_document_id("https://x/wiki/ABC123?x=1#f"),
            "ABC123"
        );
        assert_eq!(
            extract_document_id(
                "https://acme.sg.larksuite.com/wiki/JPfzwwtrui160NkKzCploKsog0f?fromScene=spaceOverview"
            ),
            "JPfzwwtrui160NkKzCploKsog0f"
        );
    }

    #[test]
    fn test_document_id_decodes_and_trims() {
        assert_eq!(extract_document_id("https://x/wiki/My%20Doc/"), "My Doc");
        assert_eq!(extract_document_id("  https://x/docx/abc  "), "abc");
    }

    #[test]
    fn test_document_id_fallback_for_relative_input() {
        assert_eq!(extract_document_id("wiki/ABC123/?q=1"), "ABC123");
        assert_eq!(extract_document_id("ABC123"), "ABC123");
        assert_eq!(extract_document_id(""), "");
        assert_eq!(extract_document_id("https://x/"), "");
    }

    #[test]
    fn test_document_id_from_url_rejects_empty() {
        assert!(DocumentId::from_url("https://x/").is_err());
        let id = DocumentId::from_url("https://x/docx/doxAbc").unwrap();
        assert_eq!(id.as_str(), "doxAbc");
    }

    #[test]
    fn test_blank_tokens_are_skipped() {
        assert!(ResourceToken::new("").is_none());
        let token = ResourceToken::new("boxcnABCDEFGHIJKLMNOPQRSTUVWXYZ").unwrap();
        assert_eq!(token.preview(), "boxcnABCDEFGHIJKLMNO");
    }
}
