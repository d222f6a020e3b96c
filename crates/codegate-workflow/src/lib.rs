//! CodeGate Workflow
//!
//! Orchestration for the human-gated pipeline: consume an approved
//! [`codegate_instruction::Instruction`], obtain a source artifact from
//! the external generation collaborator, score it with the
//! [`codegate_review`] quality gate, and record the outcome back
//! through the manager.
//!
//! The collaborators ([`CodeGenerator`], [`ReviewService`]) are trait
//! boundaries; HTTP plumbing, retry, and prompt engineering live behind
//! them, outside this crate.

mod collaborator;
mod error;
mod executor;

pub use collaborator::{CodeGenerator, CollaboratorError, ReviewService};
pub use error::WorkflowError;
pub use executor::{PipelineOutcome, WorkflowExecutor};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
