// src/gateway.rs
//! The `docs` operation: credential lookup, document-id extraction, the
//! reconstruction pipeline and the policy for failures.
//!
//! Every invocation builds its own HTTP client through a [`LarkConnector`]
//! and drops it on return, whatever the outcome.

use crate::api::{fetch_all_blocks, LarkHttpClient, LarkRepository};
use crate::auth::{CredentialProvider, LoginFlow, LoginPrompt};
use crate::error::AppError;
use crate::formatting::{assemble_document, Document, RenderContext};
use crate::media::{extract_tokens, MediaResolver, MediaStore, ResolveOptions};
use crate::types::{BearerToken, DocumentId, MediaBaseUrl};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const LOGIN_FIRST: &str = "Authentication required. Please login first.";
const NO_DOCUMENT_ID: &str = "Could not extract document ID from URL";

/// Builds a repository bound to one bearer token.
pub trait LarkConnector: Send + Sync {
    fn connect(&self, token: BearerToken) -> Result<Box<dyn LarkRepository>, AppError>;
}

/// Connects to the Lark Open API over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    api_domain: String,
}

impl HttpConnector {
    pub fn new(api_domain: impl Into<String>) -> Self {
        Self {
            api_domain: api_domain.into(),
        }
    }
}

impl LarkConnector for HttpConnector {
    fn connect(&self, token: BearerToken) -> Result<Box<dyn LarkRepository>, AppError> {
        Ok(Box::new(LarkHttpClient::new(&self.api_domain, token)?))
    }
}

/// Which pipeline failures discard the stored credential and ask for a new login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReloginPolicy {
    /// Every failure, whatever its cause.
    #[default]
    AnyFailure,
    /// Only HTTP 401/403 and Lark token error codes.
    AuthFailuresOnly,
}

impl ReloginPolicy {
    fn applies_to(&self, err: &AppError) -> bool {
        match self {
            ReloginPolicy::AnyFailure => true,
            ReloginPolicy::AuthFailuresOnly => err.is_auth_failure(),
        }
    }
}

/// Result of one `docs` invocation.
#[derive(Debug)]
pub enum DocsOutcome {
    Success(Box<Document>),
    Failure {
        error: String,
        code: Option<i64>,
    },
    NeedsLogin {
        error: String,
        code: Option<i64>,
        prompt: LoginPrompt,
    },
}

impl DocsOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DocsOutcome::Success(_))
    }

    /// The wire form returned to callers.
    pub fn to_json(&self) -> Value {
        match self {
            DocsOutcome::Success(doc) => json!({
                "success": true,
                "document_id": doc.document_id.as_str(),
                "url": doc.url,
                "content": doc.content,
                "blocks": doc.raw_content.blocks,
                "raw_content": doc.raw_content,
            }),
            DocsOutcome::Failure { error, code } => {
                let mut object = Map::new();
                object.insert("success".into(), Value::Bool(false));
                object.insert("error".into(), Value::String(error.clone()));
                if let Some(code) = code {
                    object.insert("code".into(), json!(code));
                }
                Value::Object(object)
            }
            DocsOutcome::NeedsLogin {
                error,
                code,
                prompt,
            } => {
                let mut object = Map::new();
                object.insert("success".into(), Value::Bool(false));
                object.insert("needsLogin".into(), Value::Bool(true));
                object.insert("error".into(), Value::String(error.clone()));
                object.insert(
                    "authorization_url".into(),
                    Value::String(prompt.authorization_url.clone()),
                );
                object.insert("state".into(), Value::String(prompt.state.clone()));
                object.insert("message".into(), Value::String(prompt.message.clone()));
                object.insert("next_step".into(), Value::String(prompt.next_step.clone()));
                if let Some(code) = code {
                    object.insert("code".into(), json!(code));
                }
                Value::Object(object)
            }
        }
    }
}

/// Retrieves Lark documents as flattened markdown.
pub struct DocsGateway {
    connector: Arc<dyn LarkConnector>,
    credentials: Arc<dyn CredentialProvider>,
    login: Arc<dyn LoginFlow>,
    store: MediaStore,
    media_base_url: MediaBaseUrl,
    resolve: ResolveOptions,
    relogin: ReloginPolicy,
}

impl DocsGateway {
    pub fn new(
        connector: Arc<dyn LarkConnector>,
        credentials: Arc<dyn CredentialProvider>,
        login: Arc<dyn LoginFlow>,
        store: MediaStore,
    ) -> Self {
        Self {
            connector,
            credentials,
            login,
            store,
            media_base_url: MediaBaseUrl::default(),
            resolve: ResolveOptions::default(),
            relogin: ReloginPolicy::default(),
        }
    }

    pub fn with_media_base_url(mut self, base: MediaBaseUrl) -> Self {
        self.media_base_url = base;
        self
    }

    pub fn with_resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve = options;
        self
    }

    pub fn with_relogin_policy(mut self, policy: ReloginPolicy) -> Self {
        self.relogin = policy;
        self
    }

    /// Fetches and renders the document at `url`. Never fails: every
    /// error is folded into the outcome.
    pub async fn docs(&self, url: &str) -> DocsOutcome {
        let Some(token) = self.credentials.access_token() else {
            log::info!("No bearer token available, starting login");
            return self.needs_login(LOGIN_FIRST.to_string(), None);
        };

        let document_id = match DocumentId::from_url(url) {
            Ok(id) => id,
            Err(_) => {
                return DocsOutcome::Failure {
                    error: NO_DOCUMENT_ID.to_string(),
                    code: None,
                }
            }
        };

        match self.reconstruct(token, document_id, url).await {
            Ok(doc) => DocsOutcome::Success(Box::new(doc)),
            Err(err) => self.handle_failure(err),
        }
    }

    async fn reconstruct(
        &self,
        token: BearerToken,
        document_id: DocumentId,
        url: &str,
    ) -> Result<Document, AppError> {
        log::info!("Retrieving document {}", document_id);
        let repo = self.connector.connect(token)?;

        let blocks = fetch_all_blocks(repo.as_ref(), &document_id).await?;
        let tokens = extract_tokens(&blocks);
        let media = MediaResolver::new(repo.as_ref(), &self.store, self.resolve)
            .resolve(&tokens)
            .await;

        let ctx = RenderContext {
            media_base_url: &self.media_base_url,
        };
        Ok(assemble_document(
            document_id,
            url,
            blocks,
            &tokens,
            &media,
            &ctx,
        ))
    }

    fn handle_failure(&self, err: AppError) -> DocsOutcome {
        log::error!("Document retrieval failed: {}", err);
        let code = err.machine_code();
        let summary = describe_failure(&err);

        if self.relogin.applies_to(&err) {
            self.credentials.clear();
            return self.needs_login(format!("{}. Please login again.", summary), code);
        }

        DocsOutcome::Failure {
            error: summary,
            code,
        }
    }

    fn needs_login(&self, error: String, code: Option<i64>) -> DocsOutcome {
        match self.login.begin() {
            Ok(prompt) => DocsOutcome::NeedsLogin {
                error,
                code,
                prompt,
            },
            Err(err) => {
                log::warn!("Could not start login: {}", err);
                DocsOutcome::Failure {
                    error: err.to_string(),
                    code: None,
                }
            }
        }
    }
}

/// "API error: <msg>" for provider errors, "Request failed: <e>" otherwise.
fn describe_failure(err: &AppError) -> String {
    match err {
        AppError::Fetch(fetch) => {
            let message = fetch.message.clone().unwrap_or_else(|| {
                reqwest::StatusCode::from_u16(fetch.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("HTTP {}", fetch.status))
            });
            format!("API error: {}", message)
        }
        other => format!("Request failed: {}", other),
    }
}
