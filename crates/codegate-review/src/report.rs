//! The quality report
//!
//! Structured output of one gate invocation: syntax validity,
//! categorized issues in three severity tiers, code metrics, a
//! deterministic overall score, and human-readable suggestions.
//! Reports are ephemeral; the core never persists them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity tier of a finding
///
/// Tiers drive both classification and the scoring weights
/// (critical 30, major 15, minor 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Security-grade finding
    Critical,
    /// Performance or maintainability finding
    Major,
    /// Style finding
    Minor,
}

/// Family a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// From the security scan
    Security,
    /// From the structural/performance scan
    Performance,
    /// From the style scan
    Style,
    /// The artifact failed to parse
    SyntaxError,
}

/// Closed category tag for a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Unparseable artifact
    SyntaxError,
    /// Injection via query construction
    SqlInjection,
    /// Injection via shell or eval
    CommandInjection,
    /// `name = "literal"` for a secret-like name
    HardcodedSecrets,
    /// Loop nesting beyond the configured depth
    NestedLoops,
    /// Resource opened without guaranteed release
    ResourceLeak,
    /// Function span beyond the configured length
    FunctionLength,
    /// Missing docstring
    Documentation,
}

/// One finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Scan family
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Severity tier
    pub severity: Severity,
    /// Category tag
    pub category: IssueCategory,
    /// What was found
    pub message: String,
    /// Fixed remediation text for the category
    pub recommendation: String,
    /// 1-based line, where known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Issue {
    /// Create a finding without a line anchor
    #[must_use]
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        category: IssueCategory,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            category,
            message: message.into(),
            recommendation: recommendation.into(),
            line: None,
        }
    }

    /// Attach a 1-based line number
    #[inline]
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Findings bucketed by severity, each bucket in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSet {
    /// Critical findings
    pub critical: Vec<Issue>,
    /// Major findings
    pub major: Vec<Issue>,
    /// Minor findings
    pub minor: Vec<Issue>,
}

impl IssueSet {
    /// Route a finding into its severity bucket
    pub fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Critical => self.critical.push(issue),
            Severity::Major => self.major.push(issue),
            Severity::Minor => self.minor.push(issue),
        }
    }

    /// Route a batch of findings
    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        for issue in issues {
            self.push(issue);
        }
    }

    /// Total finding count across tiers
    #[must_use]
    pub fn total(&self) -> usize {
        self.critical.len() + self.major.len() + self.minor.len()
    }
}

/// Line and definition counts for the analyzed artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMetrics {
    /// Non-blank, non-comment lines
    pub lines_of_code: usize,
    /// All lines
    pub total_lines: usize,
    /// Lines whose stripped form starts with `#`
    pub comment_lines: usize,
    /// Whitespace-only lines
    pub blank_lines: usize,
    /// Function definitions
    pub function_count: usize,
    /// Class definitions
    pub class_count: usize,
}

/// Structured output of one `review_code` invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Label supplied by the caller
    pub function_name: String,
    /// When the review ran
    pub review_date: DateTime<Utc>,
    /// Whether the artifact parsed cleanly
    pub syntax_valid: bool,
    /// Findings by severity
    pub issues: IssueSet,
    /// Line and definition counts
    pub metrics: CodeMetrics,
    /// `clamp(100 - 30c - 15m - 5n, 0, 100)`, capped at 20 when
    /// `syntax_valid` is false
    pub overall_score: u8,
    /// Deterministic, threshold-driven hints
    pub suggestions: Vec<String>,
    /// Internal review failure, if the gate degraded mid-run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QualityReport {
    /// Fresh report for a labeled artifact; nothing computed yet
    #[must_use]
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            review_date: Utc::now(),
            syntax_valid: false,
            issues: IssueSet::default(),
            metrics: CodeMetrics::default(),
            overall_score: 0,
            suggestions: Vec::new(),
            error: None,
        }
    }

    /// Compute the overall score and the suggestion list
    ///
    /// Called once, after all scans have contributed their findings.
    pub fn finalize(&mut self) {
        self.overall_score = self.compute_score();
        self.suggestions = self.generate_suggestions();
    }

    fn compute_score(&self) -> u8 {
        let deductions = 30 * self.issues.critical.len() as i64
            + 15 * self.issues.major.len() as i64
            + 5 * self.issues.minor.len() as i64;
        let mut score = 100 - deductions;
        if !self.syntax_valid {
            // Syntax failure dominates the issue-count formula.
            score = score.min(20);
        }
        score.clamp(0, 100) as u8
    }

    fn generate_suggestions(&self) -> Vec<String> {
        let mut suggestions = Vec::new();

        let critical = self.issues.critical.len();
        if critical > 0 {
            suggestions.push(format!(
                "{critical} critical issue(s) found - address the security findings immediately"
            ));
        }

        let major = self.issues.major.len();
        if major > 0 {
            suggestions.push(format!(
                "{major} major issue(s) found - consider performance and maintainability improvements"
            ));
        }

        suggestions.push(match self.overall_score {
            80.. => "Overall code quality is high.".to_string(),
            60..=79 => {
                "Generally good code; minor improvements would raise the quality further."
                    .to_string()
            }
            _ => "A significant rework of this code is recommended.".to_string(),
        });

        suggestions
    }
}
