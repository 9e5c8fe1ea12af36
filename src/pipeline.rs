// src/pipeline.rs
//! Pipeline capability traits for the CLI: retrieve, compose, deliver.
//!
//! Each trait describes a single capability, enabling testing each stage in isolation.

use crate::error::AppError;
use crate::gateway::DocsOutcome;
use crate::output::OutputReport;

/// Retrieves a document by URL.
#[async_trait::async_trait]
pub trait DocumentSource {
    async fn fetch(&self, url: &str) -> DocsOutcome;
}

/// Turns an outcome into the text handed to the outputs.
pub trait OutcomeComposer {
    fn compose(&self, outcome: &DocsOutcome) -> Result<String, AppError>;
}

/// Delivers composed text to its destinations.
pub trait OutcomeDelivery {
    fn deliver(&self, text: String) -> Result<OutputReport, AppError>;
}
