//! Error types for the quality gate
//!
//! These never escape [`crate::CodeReviewer::review_code`]; failures
//! outside the parse step are folded into the report's `error` field so
//! the gate is always call-safe.

/// Internal failures of the review machinery
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// A checklist indicator compiled to an invalid regex
    #[error("invalid indicator pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The grammar could not be loaded into the parser
    #[error("language error: {0}")]
    Language(String),

    /// The parser produced no tree at all
    #[error("parse failure: {0}")]
    Parse(String),
}
