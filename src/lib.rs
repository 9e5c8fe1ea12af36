// src/lib.rs
//! lark2md library: reconstructs Lark cloud documents as flattened markdown.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Gateway**: `DocsGateway`, `DocsOutcome`, `ReloginPolicy`
//! - **Error handling**: `AppError`, `FetchError`, `ValidationError`, `MediaError`
//! - **Configuration**: `CommandLineInput`, `PipelineConfig`
//! - **Domain model**: `Block`, `BlockKind`, `BoardNode`
//! - **Domain types**: `DocumentId`, `BlockId`, `ResourceToken`, `BearerToken`
//! - **API client**: `LarkRepository`, `LarkHttpClient`, `fetch_all_blocks`
//! - **Media**: `extract_tokens`, `MediaResolver`, `MediaStore`
//! - **Formatting**: `render_blocks`, `assemble_document`, `Document`

pub mod api;
pub mod auth;
mod config;
pub mod constants;
mod error;
pub mod formatting;
mod gateway;
pub mod media;
pub mod model;
pub mod output;
mod pipeline;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, FetchError, LarkErrorCode, Result};
pub use crate::media::MediaError;
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{Action, CliCommand, CommandLineInput, DocsArgs, PipelineConfig, ReloginArg};

// --- Gateway ---
pub use crate::gateway::{DocsGateway, DocsOutcome, HttpConnector, LarkConnector, ReloginPolicy};

// --- Credentials ---
pub use crate::auth::{
    CredentialProvider, LoginFlow, LoginPrompt, OAuthLogin, OAuthSettings, SessionStore,
    StaticToken, TokenGrant,
};

// --- Domain Model ---
pub use crate::model::{Block, BlockKind, BlockType, BoardNode};

// --- Domain Types ---
pub use crate::types::{
    extract_document_id, BearerToken, BlockId, DocumentId, MediaBaseUrl, ResourceToken,
};

// --- API Client ---
pub use crate::api::{fetch_all_blocks, LarkHttpClient, LarkRepository};

// --- Media ---
pub use crate::media::{
    extract_tokens, MediaResolution, MediaResolver, MediaStore, MediaTokens, ResolveOptions,
    ResolvedMedia,
};

// --- Formatting ---
pub use crate::formatting::{assemble_document, render_blocks, Document, RawContent, RenderContext};

// --- Output ---
pub use crate::output::{deliver, DeliveryTarget, OutputPlan, OutputReport};

// --- Pipeline Traits ---
pub use crate::pipeline::{DocumentSource, OutcomeComposer, OutcomeDelivery};
