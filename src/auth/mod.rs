// src/auth/mod.rs
//! Bearer-token supply: stored sessions, static tokens and OAuth login.

mod oauth;
mod session;

pub use oauth::{default_redirect_uri, LoginFlow, LoginPrompt, OAuthLogin, OAuthSettings};
pub use session::{CredentialProvider, SessionStore, StaticToken, TokenGrant};
