//! Collaborator interfaces for checklist capture and generation.
//!
//! The engine consumes two external capabilities through these traits and
//! never reimplements them: turning free-form text into checklist structure,
//! and generating a checklist from a condition prompt. Implementations are
//! injected so tests can substitute scripted results. Both calls are async
//! and cancellable at every await point; callers construct and persist a
//! checklist only after a fully successful result.

pub mod ollama;

pub use ollama::OllamaService;

use crate::error::ServiceResult;
use crate::types::{Extraction, Generation, InputSource};
use async_trait::async_trait;

/// Extracts checklist structure from recognized or typed text.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn extract(&self, text: &str, source: InputSource) -> ServiceResult<Extraction>;
}

/// Generates a checklist from a free-form condition.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, condition: &str) -> ServiceResult<Generation>;
}
