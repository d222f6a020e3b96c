//! The workflow executor
//!
//! Drives one approved instruction end to end: read it from the
//! manager, obtain a source artifact from the generation collaborator,
//! score it with the quality gate, optionally collect a second opinion,
//! and record execution back through the manager.
//!
//! This layer is also where caller-enforced status policy lives: the
//! manager is a pure data authority, so the executor checks the
//! lifecycle table before approving and refuses to execute anything
//! that is not Approved.

use crate::collaborator::{CodeGenerator, ReviewService};
use crate::error::WorkflowError;
use codegate_instruction::{
    validate_transition, Instruction, InstructionManager, InstructionStatus,
};
use codegate_review::{CodeReviewer, QualityReport};
use serde_json::Value;
use std::sync::Arc;

/// Everything one pipeline run produced
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Instruction that was executed
    pub instruction_id: String,
    /// Its function label
    pub function_name: String,
    /// The artifact returned by the generator
    pub generated_code: String,
    /// Quality gate output for the artifact
    pub report: QualityReport,
    /// Second-opinion text, verbatim, when the service was configured
    /// and answered
    pub external_review: Option<String>,
}

/// Orchestrates manager, generator, and gate
pub struct WorkflowExecutor {
    manager: InstructionManager,
    generator: Arc<dyn CodeGenerator>,
    gate: CodeReviewer,
    second_opinion: Option<Arc<dyn ReviewService>>,
}

impl std::fmt::Debug for WorkflowExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowExecutor")
            .field("manager", &self.manager)
            .field("second_opinion", &self.second_opinion.is_some())
            .finish()
    }
}

impl WorkflowExecutor {
    /// Build an executor over a manager, a generator, and the gate
    #[must_use]
    pub fn new(
        manager: InstructionManager,
        generator: Arc<dyn CodeGenerator>,
        gate: CodeReviewer,
    ) -> Self {
        Self {
            manager,
            generator,
            gate,
            second_opinion: None,
        }
    }

    /// Attach a second-opinion review service
    #[must_use]
    pub fn with_second_opinion(mut self, service: Arc<dyn ReviewService>) -> Self {
        self.second_opinion = Some(service);
        self
    }

    /// The underlying manager
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &InstructionManager {
        &self.manager
    }

    /// Mutable access to the underlying manager
    #[inline]
    pub fn manager_mut(&mut self) -> &mut InstructionManager {
        &mut self.manager
    }

    /// Approve an instruction, enforcing the review precondition
    ///
    /// The lifecycle table requires a review state before approval;
    /// this is the policy the manager deliberately leaves to callers.
    /// Returns `false` for an unknown id.
    ///
    /// # Errors
    /// Returns an illegal-transition error when the instruction is not
    /// in a review state, or a store error from persistence.
    pub fn approve(&mut self, id: &str, approver: &str) -> Result<bool, WorkflowError> {
        let Some(instruction) = self.manager.get(id) else {
            return Ok(false);
        };
        validate_transition(instruction.status(), InstructionStatus::Approved)
            .map_err(WorkflowError::Instruction)?;
        Ok(self.manager.approve(id, approver)?)
    }

    /// Run one approved instruction through the pipeline
    ///
    /// # Errors
    /// Fails when the instruction is unknown or not Approved, when the
    /// generator fails or returns empty content, or when recording the
    /// outcome fails. A second-opinion failure is degraded to a
    /// warning, never an error.
    pub async fn execute(&mut self, id: &str) -> Result<PipelineOutcome, WorkflowError> {
        let (function_name, prompt) = {
            let Some(instruction) = self.manager.get(id) else {
                return Err(WorkflowError::NotFound(id.to_string()));
            };
            if instruction.status() != InstructionStatus::Approved {
                return Err(WorkflowError::NotApproved {
                    id: id.to_string(),
                    status: instruction.status(),
                });
            }
            (
                instruction.function_name().to_string(),
                generation_prompt(instruction),
            )
        };

        tracing::info!("executing instruction {} - {}", id, function_name);

        let generated_code = self
            .generator
            .generate(&prompt)
            .await
            .map_err(WorkflowError::Generation)?;
        if generated_code.trim().is_empty() {
            return Err(WorkflowError::EmptyGeneration);
        }
        tracing::info!("generation complete ({} chars)", generated_code.len());

        let report = self.gate.review_code(&generated_code, &function_name);
        tracing::info!("quality gate score: {}", report.overall_score);

        let external_review = match &self.second_opinion {
            Some(service) => {
                match service
                    .review(&review_prompt(&function_name, &generated_code))
                    .await
                {
                    Ok(text) => Some(text),
                    Err(e) => {
                        tracing::warn!(
                            "external review failed: {} (artifact already generated)",
                            e
                        );
                        None
                    }
                }
            }
            None => None,
        };

        self.manager.mark_executed(id)?;

        Ok(PipelineOutcome {
            instruction_id: id.to_string(),
            function_name,
            generated_code,
            report,
            external_review,
        })
    }
}

fn generation_prompt(instruction: &Instruction) -> String {
    format!(
        "Implement the function `{}` to this requirements document:\n{}",
        instruction.function_name(),
        pretty(instruction.requirements())
    )
}

fn review_prompt(function_name: &str, code: &str) -> String {
    format!("Review this implementation of `{function_name}`:\n{code}")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
