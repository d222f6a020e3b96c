//! The instruction entity
//!
//! An [`Instruction`] is the persisted unit of work: the description of
//! a function to generate plus its approval and audit metadata. All
//! mutation goes through methods so the content hash can never go stale
//! and the audit trail only ever grows.

use crate::error::InstructionError;
use crate::hash::ContentHash;
use crate::status::InstructionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One entry in an instruction's append-only review trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    /// Comment text
    pub comment: String,
    /// Who wrote it
    pub reviewer: String,
    /// When it was written
    pub timestamp: DateTime<Utc>,
}

/// The persisted unit of work
///
/// # Invariants
/// - `id` is assigned at creation and never mutated or reused
/// - `hash` always matches the current `function_name`/`requirements`
/// - `version` starts at 1 and bumps only on requirement updates
/// - `review_comments` is append-only
/// - the approval stamp is written at most once and never cleared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    id: String,
    function_name: String,
    requirements: Value,
    status: InstructionStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    version: u32,
    hash: ContentHash,
    review_comments: Vec<ReviewComment>,
}

impl Instruction {
    /// Create a fresh draft with a new identifier
    ///
    /// # Errors
    /// Fails only if `requirements` cannot be serialized for hashing.
    pub fn new(
        function_name: impl Into<String>,
        requirements: Value,
    ) -> Result<Self, InstructionError> {
        let function_name = function_name.into();
        let hash = ContentHash::of_content(&function_name, &requirements)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            function_name,
            requirements,
            status: InstructionStatus::Draft,
            created_at: now,
            updated_at: now,
            approved_at: None,
            approved_by: None,
            version: 1,
            hash,
            review_comments: Vec::new(),
        })
    }

    /// Opaque unique identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Descriptive label for the function to generate
    #[inline]
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// The requirements document (opaque to the lifecycle)
    #[inline]
    #[must_use]
    pub fn requirements(&self) -> &Value {
        &self.requirements
    }

    /// Current lifecycle status
    #[inline]
    #[must_use]
    pub fn status(&self) -> InstructionStatus {
        self.status
    }

    /// Creation time
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last mutation time
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Approval time, if ever approved
    #[inline]
    #[must_use]
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Approver, if ever approved
    #[inline]
    #[must_use]
    pub fn approved_by(&self) -> Option<&str> {
        self.approved_by.as_deref()
    }

    /// Monotonic content version, starting at 1
    #[inline]
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Digest over `{function_name, requirements}`
    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Review trail, oldest first
    #[inline]
    #[must_use]
    pub fn review_comments(&self) -> &[ReviewComment] {
        &self.review_comments
    }

    /// Replace the requirements document
    ///
    /// Bumps the version, recomputes the hash, advances `updated_at`.
    /// Status is untouched; whether a given state may be edited is the
    /// calling layer's policy.
    ///
    /// # Errors
    /// Fails only if the new document cannot be serialized for hashing.
    pub fn update_requirements(&mut self, requirements: Value) -> Result<(), InstructionError> {
        self.hash = ContentHash::of_content(&self.function_name, &requirements)?;
        self.requirements = requirements;
        self.version += 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Rename the function this instruction describes
    ///
    /// Recomputes the hash; does not bump the version (the requirements
    /// document is unchanged).
    ///
    /// # Errors
    /// Fails only on hash serialization failure.
    pub fn set_function_name(
        &mut self,
        function_name: impl Into<String>,
    ) -> Result<(), InstructionError> {
        let function_name = function_name.into();
        self.hash = ContentHash::of_content(&function_name, &self.requirements)?;
        self.function_name = function_name;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Append a review comment (append-only, no status guard)
    pub fn add_review_comment(&mut self, comment: impl Into<String>, reviewer: impl Into<String>) {
        self.review_comments.push(ReviewComment {
            comment: comment.into(),
            reviewer: reviewer.into(),
            timestamp: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    /// Mark approved and stamp the approver
    ///
    /// The stamp is written only on the first approval; a repeat call
    /// updates status and `updated_at` but never rewrites or clears the
    /// original stamp.
    pub fn approve(&mut self, approver: impl Into<String>) {
        self.status = InstructionStatus::Approved;
        if self.approved_by.is_none() {
            self.approved_at = Some(Utc::now());
            self.approved_by = Some(approver.into());
        }
        self.updated_at = Utc::now();
    }

    /// Mark rejected, recording the reason in the review trail
    pub fn reject(&mut self, reason: &str, reviewer: impl Into<String>) {
        self.status = InstructionStatus::Rejected;
        self.add_review_comment(format!("Rejection reason: {reason}"), reviewer);
        self.updated_at = Utc::now();
    }

    /// Force a status, advancing `updated_at`
    ///
    /// Guarding which transitions are legal is the caller's job; the
    /// manager uses this for its guarded entry points.
    pub(crate) fn advance(&mut self, status: InstructionStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
