//! CodeGate Quality Gate
//!
//! Structural static analysis of a generated source artifact. Given a
//! code string, the gate parses it with tree-sitter, runs the
//! configured security / performance / style scans, and produces a
//! deterministic [`QualityReport`]: syntax validity, categorized
//! findings in three severity tiers, code metrics, an overall score in
//! `[0, 100]`, and human-readable suggestions.
//!
//! The gate is a heuristic linter for a human-in-the-loop pipeline,
//! biased toward over-reporting; it is not a sound security analysis.
//!
//! # Example
//!
//! ```rust,ignore
//! use codegate_review::{CodeReviewer, ReviewConfig};
//!
//! let reviewer = CodeReviewer::new(ReviewConfig::default());
//! let report = reviewer.review_code("def f():\n    pass\n", "f");
//! assert_eq!(report.overall_score, 95);
//! ```

mod analyzer;
mod checklist;
mod error;
mod report;
pub mod visitor;

pub use analyzer::{CodeReviewer, ReviewConfig};
pub use checklist::{Checklist, PerformanceThresholds, SecurityIndicators, StyleThresholds};
pub use error::ReviewError;
pub use report::{
    CodeMetrics, Issue, IssueCategory, IssueKind, IssueSet, QualityReport, Severity,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
