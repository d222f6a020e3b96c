//! The code reviewer
//!
//! Parses a source artifact with tree-sitter and runs the configured
//! scans over it. `review_code` is total: it returns a report for every
//! input, folding internal failures into the report's `error` field
//! instead of surfacing them to the caller.

use crate::checklist::Checklist;
use crate::error::ReviewError;
use crate::report::{CodeMetrics, Issue, IssueCategory, IssueKind, QualityReport, Severity};
use crate::visitor::{
    collect_functions, first_error_line, max_loop_depth, visit, DefinitionCounts,
};
use regex::Regex;
use std::path::PathBuf;
use tree_sitter::{Node, Parser, Tree};

/// Reviewer construction options
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Run the security scan
    pub enable_security_check: bool,
    /// Run the structural/performance scan
    pub enable_performance_check: bool,
    /// Run the style scan
    pub enable_style_check: bool,
    /// Checklist file; built-in default when absent
    pub checklist_path: Option<PathBuf>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            enable_security_check: true,
            enable_performance_check: true,
            enable_style_check: true,
            checklist_path: None,
        }
    }
}

/// The automated quality gate
///
/// Pure computation over its input string: no I/O after construction,
/// no shared mutable state, safe to call from any number of threads.
#[derive(Debug, Clone)]
pub struct CodeReviewer {
    config: ReviewConfig,
    checklist: Checklist,
}

impl CodeReviewer {
    /// Build a reviewer, loading the checklist named by the config
    #[must_use]
    pub fn new(config: ReviewConfig) -> Self {
        let checklist = config
            .checklist_path
            .as_deref()
            .map(Checklist::load)
            .unwrap_or_default();
        Self { config, checklist }
    }

    /// Build a reviewer over an explicit checklist
    #[must_use]
    pub fn with_checklist(config: ReviewConfig, checklist: Checklist) -> Self {
        Self { config, checklist }
    }

    /// The active rule set
    #[inline]
    #[must_use]
    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// Review one source artifact
    ///
    /// Produces the full quality report: syntax validity, categorized
    /// issues, metrics, score, and suggestions. Never fails; internal
    /// errors degrade into the report's `error` field.
    #[must_use]
    pub fn review_code(&self, code: &str, function_name: &str) -> QualityReport {
        tracing::info!("code review started: {}", function_name);
        let mut report = QualityReport::new(function_name);

        let tree = match parse_python(code) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::error!("review machinery failure: {}", e);
                report.error = Some(e.to_string());
                return report;
            }
        };
        let root = tree.root_node();

        // The error-tolerant tree makes metrics computable either way.
        report.metrics = compute_metrics(code, root);

        if root.has_error() {
            report.syntax_valid = false;
            let line = first_error_line(root).unwrap_or(0);
            report.issues.push(
                Issue::new(
                    IssueKind::SyntaxError,
                    Severity::Critical,
                    IssueCategory::SyntaxError,
                    format!("syntax error near line {line}"),
                    "fix the syntax before review can proceed",
                )
                .with_line(line),
            );
            report.finalize();
            tracing::info!("code review complete: score {}", report.overall_score);
            return report;
        }
        report.syntax_valid = true;

        if let Err(e) = self.run_scans(code, root, &mut report) {
            tracing::error!("review processing error: {}", e);
            report.error = Some(e.to_string());
            return report;
        }

        report.finalize();
        tracing::info!("code review complete: score {}", report.overall_score);
        report
    }

    fn run_scans(
        &self,
        code: &str,
        root: Node<'_>,
        report: &mut QualityReport,
    ) -> Result<(), ReviewError> {
        if self.config.enable_security_check {
            report.issues.extend(self.check_security(code)?);
        }
        if self.config.enable_performance_check {
            report.issues.extend(self.check_performance(code, root));
        }
        if self.config.enable_style_check {
            report.issues.extend(self.check_style(code, root));
        }
        Ok(())
    }

    /// Security scan over the raw text, one issue per occurrence
    fn check_security(&self, code: &str) -> Result<Vec<Issue>, ReviewError> {
        let mut issues = Vec::new();
        let lowered = code.to_lowercase();

        for pattern in &self.checklist.security.sql_injection {
            if pattern.is_empty() {
                continue;
            }
            for _ in lowered.match_indices(&pattern.to_lowercase()) {
                issues.push(Issue::new(
                    IssueKind::Security,
                    Severity::Critical,
                    IssueCategory::SqlInjection,
                    format!("possible SQL injection: indicator {pattern:?} detected"),
                    "use parameterized queries instead of string-built SQL",
                ));
            }
        }

        for pattern in &self.checklist.security.command_injection {
            if pattern.is_empty() {
                continue;
            }
            for _ in code.match_indices(pattern.as_str()) {
                issues.push(Issue::new(
                    IssueKind::Security,
                    Severity::Critical,
                    IssueCategory::CommandInjection,
                    format!("possible command injection: indicator {pattern:?} detected"),
                    "validate and escape all externally-influenced input",
                ));
            }
        }

        for name in &self.checklist.security.hardcoded_secrets {
            if name.is_empty() {
                continue;
            }
            // Names are regex fragments; an invalid fragment surfaces as
            // a Pattern error and degrades into the report's error field.
            let assignment = Regex::new(&format!(r#"(?i){name}\s*=\s*["'][^"']+["']"#))?;
            for _ in assignment.find_iter(code) {
                issues.push(Issue::new(
                    IssueKind::Security,
                    Severity::Major,
                    IssueCategory::HardcodedSecrets,
                    format!("hardcoded secret: {name:?} assigned a literal value"),
                    "load secrets from the environment or a config file",
                ));
            }
        }

        Ok(issues)
    }

    /// Structural scan: loop nesting via the tree, resource use textually
    fn check_performance(&self, code: &str, root: Node<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();

        let depth = max_loop_depth(root);
        if depth > self.checklist.performance.max_loop_depth {
            issues.push(Issue::new(
                IssueKind::Performance,
                Severity::Major,
                IssueCategory::NestedLoops,
                format!("deeply nested loops detected (depth {depth})"),
                "revisit the algorithm to flatten the loop structure",
            ));
        }

        // Textual heuristic, deliberately conservative.
        if self.checklist.performance.flag_unscoped_open
            && code.contains("open(")
            && !code.contains("with open(")
        {
            issues.push(Issue::new(
                IssueKind::Performance,
                Severity::Major,
                IssueCategory::ResourceLeak,
                "a file may be opened without guaranteed release",
                "open files in a `with` block so they always close",
            ));
        }

        issues
    }

    /// Style scan: function spans and docstrings via the tree
    fn check_style(&self, code: &str, root: Node<'_>) -> Vec<Issue> {
        let mut issues = Vec::new();
        let functions = collect_functions(root, code.as_bytes());

        for function in &functions {
            if function.line_span > self.checklist.style.max_function_lines {
                issues.push(
                    Issue::new(
                        IssueKind::Style,
                        Severity::Minor,
                        IssueCategory::FunctionLength,
                        format!(
                            "function '{}' is too long ({} lines)",
                            function.name, function.line_span
                        ),
                        "consider splitting the function",
                    )
                    .with_line(function.line),
                );
            }
        }

        if self.checklist.style.require_docstrings {
            for function in &functions {
                if !function.has_docstring {
                    issues.push(
                        Issue::new(
                            IssueKind::Style,
                            Severity::Minor,
                            IssueCategory::Documentation,
                            format!("function '{}' has no docstring", function.name),
                            "add a docstring describing the function",
                        )
                        .with_line(function.line),
                    );
                }
            }
        }

        issues
    }
}

impl Default for CodeReviewer {
    fn default() -> Self {
        Self::new(ReviewConfig::default())
    }
}

/// Parse an artifact as Python
pub(crate) fn parse_python(code: &str) -> Result<Tree, ReviewError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ReviewError::Language(e.to_string()))?;
    parser
        .parse(code, None)
        .ok_or_else(|| ReviewError::Parse("parser produced no tree".to_string()))
}

/// Line and definition counts, independent of the scans
fn compute_metrics(code: &str, root: Node<'_>) -> CodeMetrics {
    let lines: Vec<&str> = code.split('\n').collect();
    let blank_lines = lines.iter().filter(|line| line.trim().is_empty()).count();
    let comment_lines = lines
        .iter()
        .filter(|line| line.trim().starts_with('#'))
        .count();

    let mut counts = DefinitionCounts::default();
    visit(root, &mut counts);

    CodeMetrics {
        lines_of_code: lines.len() - blank_lines - comment_lines,
        total_lines: lines.len(),
        comment_lines,
        blank_lines,
        function_count: counts.functions,
        class_count: counts.classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reviewer() -> CodeReviewer {
        CodeReviewer::default()
    }

    #[test]
    fn documented_clean_function_scores_100() {
        let code = "\
def add(a, b):
    \"\"\"Return the sum.\"\"\"
    return a + b
";
        let report = reviewer().review_code(code, "add");
        assert!(report.syntax_valid);
        assert_eq!(report.issues.total(), 0);
        assert_eq!(report.overall_score, 100);
        assert!(report.error.is_none());
    }

    #[test]
    fn missing_docstring_costs_five_points() {
        let report = reviewer().review_code("def f():\n    pass\n", "f");
        assert!(report.syntax_valid);
        assert_eq!(report.issues.minor.len(), 1);
        assert_eq!(report.issues.minor[0].category, IssueCategory::Documentation);
        assert_eq!(report.overall_score, 95);
    }

    #[test]
    fn hardcoded_password_is_one_major_issue() {
        let code = "password = \"abc123\"\n";
        let report = reviewer().review_code(code, "config");
        assert!(report.syntax_valid);
        assert_eq!(report.issues.major.len(), 1);
        assert_eq!(
            report.issues.major[0].category,
            IssueCategory::HardcodedSecrets
        );
        assert_eq!(report.overall_score, 85);
    }

    #[test]
    fn unparseable_code_caps_the_score() {
        let report = reviewer().review_code("def f(:\n", "broken");
        assert!(!report.syntax_valid);
        assert_eq!(report.issues.critical.len(), 1);
        assert_eq!(report.issues.critical[0].category, IssueCategory::SyntaxError);
        assert!(report.overall_score <= 20);
        // Metrics still come from the error-tolerant tree.
        assert_eq!(report.metrics.total_lines, 2);
    }

    #[test]
    fn injection_indicators_count_per_occurrence() {
        let code = "\
def run(db):
    \"\"\"Run it.\"\"\"
    db.execute(\"DELETE FROM t\")
    db.execute(\"DROP TABLE t\")
";
        let report = reviewer().review_code(code, "run");
        // Two occurrences of "execute" (sql family, case-insensitive)
        // and two of its "exec" prefix (command family, case-sensitive).
        let sql = report
            .issues
            .critical
            .iter()
            .filter(|i| i.category == IssueCategory::SqlInjection)
            .count();
        let command = report
            .issues
            .critical
            .iter()
            .filter(|i| i.category == IssueCategory::CommandInjection)
            .count();
        assert_eq!(sql, 2);
        assert_eq!(command, 2);
    }

    #[test]
    fn deep_loop_nesting_is_one_major_issue() {
        let code = "\
def cube(items):
    \"\"\"Walk every triple.\"\"\"
    for a in items:
        for b in items:
            for c in items:
                yield a, b, c
";
        let report = reviewer().review_code(code, "cube");
        let nested: Vec<_> = report
            .issues
            .major
            .iter()
            .filter(|i| i.category == IssueCategory::NestedLoops)
            .collect();
        assert_eq!(nested.len(), 1);
        assert!(nested[0].message.contains("depth 3"));
    }

    #[test]
    fn double_nesting_is_fine() {
        let code = "\
def grid(items):
    \"\"\"Walk every pair.\"\"\"
    for a in items:
        for b in items:
            yield a, b
";
        let report = reviewer().review_code(code, "grid");
        assert!(report
            .issues
            .major
            .iter()
            .all(|i| i.category != IssueCategory::NestedLoops));
    }

    #[test]
    fn unscoped_open_is_flagged_and_with_open_is_not() {
        let leaky = "\
def read(path):
    \"\"\"Read a file.\"\"\"
    f = open(path)
    return f.read()
";
        let report = reviewer().review_code(leaky, "read");
        assert!(report
            .issues
            .major
            .iter()
            .any(|i| i.category == IssueCategory::ResourceLeak));

        let scoped = "\
def read(path):
    \"\"\"Read a file.\"\"\"
    with open(path) as f:
        return f.read()
";
        let report = reviewer().review_code(scoped, "read");
        assert!(report
            .issues
            .major
            .iter()
            .all(|i| i.category != IssueCategory::ResourceLeak));
    }

    #[test]
    fn long_functions_are_named_in_the_finding() {
        let mut code = String::from("def long_one(x):\n    \"\"\"Pad.\"\"\"\n");
        for i in 0..60 {
            code.push_str(&format!("    x += {i}\n"));
        }
        code.push_str("    return x\n");

        let report = reviewer().review_code(&code, "long_one");
        let long: Vec<_> = report
            .issues
            .minor
            .iter()
            .filter(|i| i.category == IssueCategory::FunctionLength)
            .collect();
        assert_eq!(long.len(), 1);
        assert!(long[0].message.contains("long_one"));
    }

    #[test]
    fn disabled_scans_contribute_nothing() {
        let config = ReviewConfig {
            enable_security_check: false,
            enable_performance_check: false,
            enable_style_check: false,
            checklist_path: None,
        };
        let report = CodeReviewer::new(config).review_code("password = \"x1\"\n", "quiet");
        assert_eq!(report.issues.total(), 0);
        assert_eq!(report.overall_score, 100);
    }

    #[test]
    fn malformed_indicator_degrades_into_the_error_field() {
        let mut checklist = Checklist::default();
        checklist.security.hardcoded_secrets = vec!["(".to_string()];
        let reviewer = CodeReviewer::with_checklist(ReviewConfig::default(), checklist);

        let report = reviewer.review_code("def f():\n    \"\"\"Doc.\"\"\"\n    pass\n", "f");
        assert!(report.syntax_valid);
        assert!(report.error.is_some());
        // Degraded mid-run: whatever was computed before the failure stays.
        assert_eq!(report.overall_score, 0);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn metrics_count_lines_and_definitions() {
        let code = "\
# module comment

class Box:
    def get(self):
        \"\"\"Return it.\"\"\"
        return self.value
";
        let report = reviewer().review_code(code, "box");
        assert_eq!(report.metrics.total_lines, 7);
        assert_eq!(report.metrics.comment_lines, 1);
        assert_eq!(report.metrics.blank_lines, 2);
        assert_eq!(report.metrics.lines_of_code, 4);
        assert_eq!(report.metrics.function_count, 1);
        assert_eq!(report.metrics.class_count, 1);
    }
}
