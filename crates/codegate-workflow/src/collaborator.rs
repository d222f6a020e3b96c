//! Collaborator contracts
//!
//! The two generative services the pipeline consumes, modeled as trait
//! boundaries only. Both are treated as unreliable; retry policy lives
//! in the client layer behind the trait, never here.

use async_trait::async_trait;

/// Failure modes of a generative collaborator
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// Endpoint unreachable or refused the request
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// No response within the client's deadline
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The service answered with empty content
    #[error("service returned empty content")]
    Empty,
}

/// Code-generation service: prompt text in, candidate source out
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Generate a source artifact for `prompt`
    ///
    /// # Errors
    /// Returns [`CollaboratorError`] when the service fails; the
    /// caller decides whether and how to retry.
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

/// Second-opinion review service
///
/// Output is carried verbatim alongside the quality report; it is
/// never parsed or scored.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Produce a free-form review of the prompt's contents
    ///
    /// # Errors
    /// Returns [`CollaboratorError`] when the service fails.
    async fn review(&self, prompt: &str) -> Result<String, CollaboratorError>;
}
