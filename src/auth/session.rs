// src/auth/session.rs
//! Credential storage.
//!
//! The gateway asks a [`CredentialProvider`] for a bearer token on every
//! invocation and tells it to forget the token when the policy demands a
//! fresh login.

use crate::types::BearerToken;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Tokens are treated as expired this long before the server says so.
const EXPIRY_BUFFER_SECS: i64 = 60;

/// The result of a successful authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: BearerToken,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, when the server reported one
    pub expires_in: Option<i64>,
}

/// Something that can supply, store and forget a bearer token.
pub trait CredentialProvider: Send + Sync {
    /// The current usable token, if any.
    fn access_token(&self) -> Option<BearerToken>;

    /// Forgets the current token.
    fn clear(&self);

    fn store(&self, grant: TokenGrant);
}

#[derive(Debug, Clone)]
struct Session {
    access_token: BearerToken,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at - Duration::seconds(EXPIRY_BUFFER_SECS),
            None => false,
        }
    }
}

/// In-memory OAuth session: one user token with an optional expiry.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `token`, without expiry.
    pub fn with_token(token: BearerToken) -> Self {
        let store = Self::new();
        store.store(TokenGrant {
            access_token: token,
            refresh_token: None,
            expires_in: None,
        });
        store
    }

    /// The token as of `now`, honouring the expiry buffer.
    pub fn access_token_at(&self, now: DateTime<Utc>) -> Option<BearerToken> {
        let session = self.session.read();
        session
            .as_ref()
            .filter(|s| !s.is_expired_at(now))
            .map(|s| s.access_token.clone())
    }

    fn store_at(&self, grant: TokenGrant, now: DateTime<Utc>) {
        let expires_at = grant
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| now + Duration::seconds(secs));
        *self.session.write() = Some(Session {
            access_token: grant.access_token,
            expires_at,
        });
    }
}

impl CredentialProvider for SessionStore {
    fn access_token(&self) -> Option<BearerToken> {
        self.access_token_at(Utc::now())
    }

    fn clear(&self) {
        log::debug!("Clearing stored session");
        *self.session.write() = None;
    }

    fn store(&self, grant: TokenGrant) {
        self.store_at(grant, Utc::now());
    }
}

/// A fixed token from the environment or the command line.
///
/// Clearing it has no effect: the operator supplied it and only the
/// operator can replace it.
#[derive(Debug, Clone)]
pub struct StaticToken(BearerToken);

impl StaticToken {
    pub fn new(token: BearerToken) -> Self {
        Self(token)
    }
}

impl CredentialProvider for StaticToken {
    fn access_token(&self) -> Option<BearerToken> {
        Some(self.0.clone())
    }

    fn clear(&self) {
        log::debug!("Static bearer token cannot be cleared");
    }

    fn store(&self, _grant: TokenGrant) {
        log::debug!("Ignoring token grant for static bearer token");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(expires_in: Option<i64>) -> TokenGrant {
        TokenGrant {
            access_token: BearerToken::new("u-abc123").unwrap(),
            refresh_token: Some("r-1".to_string()),
            expires_in,
        }
    }

    #[test]
    fn test_expiry_buffer() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.store_at(grant(Some(7200)), now);

        assert!(store.access_token_at(now).is_some());
        assert!(store.access_token_at(now + Duration::seconds(7139)).is_some());
        assert!(store.access_token_at(now + Duration::seconds(7140)).is_none());
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let store = SessionStore::new();
        store.store(grant(None));
        assert!(store
            .access_token_at(Utc::now() + Duration::days(365))
            .is_some());
    }

    #[test]
    fn test_clear() {
        let store = SessionStore::with_token(BearerToken::new("u-x").unwrap());
        assert!(store.access_token().is_some());
        store.clear();
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_static_token_survives_clear() {
        let token = StaticToken::new(BearerToken::new("t-env").unwrap());
        token.clear();
        assert_eq!(token.access_token().unwrap().as_str(), "t-env");
    }
}
