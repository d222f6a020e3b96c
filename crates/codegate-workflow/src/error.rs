//! Error types for workflow execution

use crate::collaborator::CollaboratorError;
use codegate_instruction::{InstructionError, InstructionStatus};

/// Errors raised while driving an instruction through the pipeline
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// No instruction with this id
    #[error("instruction not found: {0}")]
    NotFound(String),

    /// The instruction is not in the Approved state
    #[error("instruction {id} is not approved (status: {status})")]
    NotApproved {
        /// Instruction id
        id: String,
        /// Its current status
        status: InstructionStatus,
    },

    /// The generation collaborator failed
    #[error("generation failed: {0}")]
    Generation(CollaboratorError),

    /// The generation collaborator returned empty content
    #[error("generation returned empty content")]
    EmptyGeneration,

    /// Lifecycle-layer failure
    #[error(transparent)]
    Instruction(#[from] InstructionError),
}
