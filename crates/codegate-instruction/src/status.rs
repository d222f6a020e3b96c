//! Instruction lifecycle states
//!
//! The status model is a closed enum; the transition table lives here
//! so state policy is inspectable in one place. The manager itself only
//! guards the transitions the contract requires it to guard
//! (`mark_executed` and the recovered entry points); approval
//! preconditions are enforced by callers against this table.

use crate::error::InstructionError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Lifecycle state of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionStatus {
    /// Just drafted, not yet submitted
    Draft,
    /// Waiting for a human reviewer
    PendingReview,
    /// A reviewer has picked it up
    UnderReview,
    /// Approved for execution
    Approved,
    /// Rejected by a reviewer (terminal)
    Rejected,
    /// Code was generated and gated
    Executed,
    /// Retired (terminal); archival is a status, never a deletion
    Archived,
}

impl InstructionStatus {
    /// Every declared status, in lifecycle order
    pub const ALL: [InstructionStatus; 7] = [
        InstructionStatus::Draft,
        InstructionStatus::PendingReview,
        InstructionStatus::UnderReview,
        InstructionStatus::Approved,
        InstructionStatus::Rejected,
        InstructionStatus::Executed,
        InstructionStatus::Archived,
    ];

    /// Snake-case string form, as persisted
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionStatus::Draft => "draft",
            InstructionStatus::PendingReview => "pending_review",
            InstructionStatus::UnderReview => "under_review",
            InstructionStatus::Approved => "approved",
            InstructionStatus::Rejected => "rejected",
            InstructionStatus::Executed => "executed",
            InstructionStatus::Archived => "archived",
        }
    }

    /// Whether no further transitions are defined from this state
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        allowed_transitions(*self).is_empty()
    }
}

impl Display for InstructionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionStatus {
    type Err = InstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstructionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InstructionError::InvalidStatus(s.to_string()))
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: InstructionStatus) -> Vec<InstructionStatus> {
    use InstructionStatus::*;
    match from {
        Draft => vec![PendingReview],
        PendingReview => vec![UnderReview, Approved, Rejected],
        UnderReview => vec![Approved, Rejected],
        Approved => vec![Executed],
        Executed => vec![Archived],
        Rejected => vec![],
        Archived => vec![],
    }
}

/// Validate a single transition against the table
///
/// # Errors
/// Returns [`InstructionError::IllegalTransition`] when `to` is not
/// reachable from `from`.
pub fn validate_transition(
    from: InstructionStatus,
    to: InstructionStatus,
) -> Result<(), InstructionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(InstructionError::IllegalTransition { from, to })
    }
}
