// src/auth/oauth.rs
//! Interactive OAuth2 login against the Lark accounts service.

use super::session::{CredentialProvider, TokenGrant};
use crate::constants::{DEFAULT_API_DOMAIN, DEFAULT_AUTH_DOMAIN, DEFAULT_STATIC_PORT, OAUTH_SCOPES};
use crate::error::AppError;
use crate::types::BearerToken;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

const STATE_LENGTH: usize = 43;

/// OAuth application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    /// Accounts domain hosting the authorization page
    pub auth_domain: String,
    /// Open API domain hosting the token endpoint
    pub api_domain: String,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: default_redirect_uri(),
            auth_domain: DEFAULT_AUTH_DOMAIN.to_string(),
            api_domain: DEFAULT_API_DOMAIN.to_string(),
        }
    }
}

pub fn default_redirect_uri() -> String {
    format!("http://localhost:{}/oauth/callback", DEFAULT_STATIC_PORT)
}

/// What a user needs to complete an interactive login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginPrompt {
    pub authorization_url: String,
    pub state: String,
    pub message: String,
    pub next_step: String,
}

/// The ability to start an interactive login.
pub trait LoginFlow: Send + Sync {
    fn begin(&self) -> Result<LoginPrompt, AppError>;
}

pub struct OAuthLogin {
    settings: OAuthSettings,
    http: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    data: Option<Value>,
}

impl OAuthLogin {
    pub fn new(settings: OAuthSettings) -> Result<Self, AppError> {
        Ok(Self {
            settings,
            http: reqwest::Client::builder().build()?,
        })
    }

    fn client_credentials(&self) -> Result<(&str, &str), AppError> {
        let client_id = self
            .settings
            .client_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::MissingConfiguration("LARK_CLIENT_ID not configured".to_string()))?;
        let client_secret = self
            .settings
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::MissingConfiguration("LARK_CLIENT_SECRET not configured".to_string())
            })?;
        Ok((client_id, client_secret))
    }

    /// Builds the authorization page URL carrying `state`.
    pub fn authorization_url(&self, state: &str) -> Result<Url, AppError> {
        let (client_id, _) = self.client_credentials()?;
        let base = format!(
            "{}/open-apis/authen/v1/index",
            self.settings.auth_domain.trim_end_matches('/')
        );
        Url::parse_with_params(
            &base,
            &[
                ("app_id", client_id),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("state", state),
                ("scope", OAUTH_SCOPES),
            ],
        )
        .map_err(|e| AppError::MissingConfiguration(format!("Invalid accounts domain: {}", e)))
    }

    /// Exchanges an authorization code for a user token and stores it.
    pub async fn exchange_code(
        &self,
        code: &str,
        credentials: &dyn CredentialProvider,
    ) -> Result<TokenGrant, AppError> {
        let (client_id, client_secret) = self.client_credentials()?;
        let url = format!(
            "{}/open-apis/authen/v2/oauth/token",
            self.settings.api_domain.trim_end_matches('/')
        );
        log::debug!("POST {}", url);

        let body = json!({
            "grant_type": "authorization_code",
            "client_id": client_id,
            "client_secret": client_secret,
            "code": code,
            "redirect_uri": self.settings.redirect_uri,
        });
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let grant = parse_token_response(status, &text)?;
        log::info!("Token exchange succeeded");
        credentials.store(grant.clone());
        Ok(grant)
    }
}

impl LoginFlow for OAuthLogin {
    fn begin(&self) -> Result<LoginPrompt, AppError> {
        let state: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(STATE_LENGTH)
            .map(char::from)
            .collect();
        let url = self.authorization_url(&state)?;
        log::info!("Generated authorization URL (redirect {})", self.settings.redirect_uri);

        Ok(LoginPrompt {
            message: format!(
                "Interactive login started.\n\nOpen this URL in your browser:\n\n{}\n\n\
                 After you authorize, you will be redirected with an authorization code.",
                url
            ),
            authorization_url: url.into(),
            state,
            next_step: "After authorizing, run `lark2md exchange --code <code>` with the code from the redirect."
                .to_string(),
        })
    }
}

fn parse_token_response(status: reqwest::StatusCode, text: &str) -> Result<TokenGrant, AppError> {
    let response: TokenResponse = serde_json::from_str(text).map_err(|_| {
        AppError::OAuth(format!(
            "Invalid JSON response: {}",
            text.chars().take(200).collect::<String>()
        ))
    })?;

    if !status.is_success() {
        let detail = response
            .msg
            .or(response.error_description)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        return Err(AppError::OAuth(format!(
            "Failed to get access token (HTTP {}): {}",
            status.as_u16(),
            detail
        )));
    }

    if let Some(error) = response.error {
        return Err(AppError::OAuth(format!(
            "{} - {}",
            error,
            response
                .error_description
                .unwrap_or_else(|| "Unknown error".to_string())
        )));
    }

    if let Some(code) = response.code.filter(|c| *c != 0) {
        return Err(AppError::OAuth(format!(
            "Failed to get access token (code {}): {}",
            code,
            response.msg.unwrap_or_else(|| "Unknown error".to_string())
        )));
    }

    // The v2 endpoint answers at top level; older responses nest under `data`.
    let (access_token, refresh_token, expires_in) = match response.access_token {
        Some(token) if !token.is_empty() => (Some(token), response.refresh_token, response.expires_in),
        _ => {
            let data = response.data.unwrap_or_default();
            (
                data.get("access_token").and_then(Value::as_str).map(str::to_string),
                data.get("refresh_token").and_then(Value::as_str).map(str::to_string),
                data.get("expires_in").and_then(Value::as_i64),
            )
        }
    };

    let access_token = access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::OAuth("No access token in response".to_string()))?;

    Ok(TokenGrant {
        access_token: BearerToken::new(access_token)?,
        refresh_token,
        expires_in,
    })
}
