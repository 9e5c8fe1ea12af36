// src/error.rs
//! Application error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system.
//! Required-path failures (block fetch, sheet metadata, sheet values)
//! surface as [`FetchError`]; missing credentials as
//! [`AppError::AuthRequired`]. Best-effort media failures live in
//! [`crate::media::MediaError`] and never reach this type.

use std::fmt;
use thiserror::Error;

/// Lark Open API error codes as a typed vocabulary.
///
/// Only the codes the gateway reacts to are named; everything else is
/// carried through as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LarkErrorCode {
    /// The request carried no access token
    MissingAccessToken,
    /// The access token is malformed or unknown
    InvalidAccessToken,
    /// The user access token was revoked or is otherwise invalid
    UserTokenInvalid,
    /// The access token has expired
    AccessTokenExpired,
    /// Request frequency limit triggered
    RateLimited,
    /// A code this client doesn't classify
    Other(i64),
}

impl LarkErrorCode {
    /// Maps a nonzero envelope `code` into the typed vocabulary.
    pub fn from_code(code: i64) -> Self {
        match code {
            99991661 => Self::MissingAccessToken,
            99991663 => Self::InvalidAccessToken,
            99991668 => Self::UserTokenInvalid,
            99991677 => Self::AccessTokenExpired,
            99991400 => Self::RateLimited,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::MissingAccessToken => 99991661,
            Self::InvalidAccessToken => 99991663,
            Self::UserTokenInvalid => 99991668,
            Self::AccessTokenExpired => 99991677,
            Self::RateLimited => 99991400,
            Self::Other(code) => *code,
        }
    }

    /// Whether the code says the credential itself is unusable.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingAccessToken
                | Self::InvalidAccessToken
                | Self::UserTokenInvalid
                | Self::AccessTokenExpired
        )
    }
}

impl fmt::Display for LarkErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A required API call failed: non-2xx status or nonzero envelope code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    /// HTTP status of the response
    pub status: u16,
    /// Envelope `code`, when the body could be parsed
    pub code: Option<LarkErrorCode>,
    /// Provider-supplied `msg`, when present
    pub message: Option<String>,
    /// Endpoint path, for diagnostics
    pub endpoint: String,
}

impl FetchError {
    /// Whether this failure indicates a bad or missing credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 403) || self.code.is_some_and(|c| c.is_auth_failure())
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Machine error code for failure results: the envelope code, else the HTTP status.
    pub fn machine_code(&self) -> i64 {
        self.code
            .map(|c| c.code())
            .unwrap_or_else(|| i64::from(self.status))
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "API error: {}", message)?,
            None => write!(f, "API error: HTTP {} from {}", self.status, self.endpoint)?,
        }
        if let Some(code) = self.code {
            write!(f, " (code {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for FetchError {}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Authentication required: {0}")]
    AuthRequired(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error interacting with clipboard: {0}")]
    Clipboard(String),

    #[error("Output delivery failed: {}", failures.join(", "))]
    DeliveryFailed { failures: Vec<String> },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether the error points at the credential rather than the request.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            AppError::AuthRequired(_) => true,
            AppError::Fetch(err) => err.is_auth_failure(),
            AppError::NetworkFailure(err) => err
                .status()
                .is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403),
            _ => false,
        }
    }

    /// Machine-readable error code for failure results, when one exists.
    pub fn machine_code(&self) -> Option<i64> {
        match self {
            AppError::Fetch(err) => Some(err.machine_code()),
            AppError::NetworkFailure(err) => err.status().map(|s| i64::from(s.as_u16())),
            _ => None,
        }
    }
}

impl From<arboard::Error> for AppError {
    fn from(err: arboard::Error) -> Self {
        AppError::Clipboard(format!("Clipboard error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
