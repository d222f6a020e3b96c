//! Review checklist configuration
//!
//! The indicator families and thresholds the gate scans with. The
//! checklist is plain data loaded from a JSON file so new indicators
//! can be added without code changes; it is a heuristic linter's rule
//! set, not a sound security analysis.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full rule set for one reviewer instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checklist {
    /// Security indicator families
    pub security: SecurityIndicators,
    /// Structural/performance thresholds
    pub performance: PerformanceThresholds,
    /// Style thresholds
    pub style: StyleThresholds,
}

/// Indicator phrase lists for the security scan
///
/// `file_traversal` is carried in the configuration format but not
/// scanned; the scan covers the two injection families and the
/// hardcoded-secret family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityIndicators {
    /// Injection via query construction (case-insensitive substrings)
    pub sql_injection: Vec<String>,
    /// Injection via shell/eval (case-sensitive substrings)
    pub command_injection: Vec<String>,
    /// Traversal indicators (configuration-only)
    pub file_traversal: Vec<String>,
    /// Regex fragments matched as `<name> = "<literal>"`
    pub hardcoded_secrets: Vec<String>,
}

/// Thresholds for the structural/performance scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceThresholds {
    /// Flag loop nesting strictly deeper than this
    pub max_loop_depth: usize,
    /// Flag `open(` without an accompanying `with open(`
    pub flag_unscoped_open: bool,
}

/// Thresholds for the style scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleThresholds {
    /// Flag functions spanning strictly more lines than this
    pub max_function_lines: usize,
    /// Flag functions whose first statement is not a string literal
    pub require_docstrings: bool,
}

impl Default for SecurityIndicators {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(ToString::to_string).collect();
        Self {
            sql_injection: list(&["sql", "query", "execute", "cursor"]),
            command_injection: list(&["os.system", "subprocess", "eval", "exec"]),
            file_traversal: list(&["../", "..\\", "open(", "file("]),
            hardcoded_secrets: list(&["password", "api_key", "secret", "token"]),
        }
    }
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            max_loop_depth: 2,
            flag_unscoped_open: true,
        }
    }
}

impl Default for StyleThresholds {
    fn default() -> Self {
        Self {
            max_function_lines: 50,
            require_docstrings: true,
        }
    }
}

impl Default for Checklist {
    fn default() -> Self {
        Self {
            security: SecurityIndicators::default(),
            performance: PerformanceThresholds::default(),
            style: StyleThresholds::default(),
        }
    }
}

impl Checklist {
    /// Load a checklist from a JSON file
    ///
    /// Absent or malformed files fall back to the built-in default
    /// with a warning; checklist loading never fails construction.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(checklist) => checklist,
                Err(e) => {
                    tracing::warn!(
                        "malformed checklist {}: {} - using built-in default",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "checklist {} unreadable: {} - using built-in default",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_families_match_the_shipped_rule_set() {
        let checklist = Checklist::default();
        assert!(checklist.security.sql_injection.contains(&"query".to_string()));
        assert!(checklist.security.command_injection.contains(&"eval".to_string()));
        assert!(checklist.security.hardcoded_secrets.contains(&"password".to_string()));
        assert_eq!(checklist.performance.max_loop_depth, 2);
        assert_eq!(checklist.style.max_function_lines, 50);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let checklist = Checklist::load(Path::new("/nonexistent/checklist.json"));
        assert_eq!(checklist, Checklist::default());
    }

    #[test]
    fn malformed_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.json");
        std::fs::write(&path, "{broken").unwrap();
        assert_eq!(Checklist::load(&path), Checklist::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checklist.json");
        std::fs::write(
            &path,
            r#"{"security": {"hardcoded_secrets": ["private_key"]}}"#,
        )
        .unwrap();

        let checklist = Checklist::load(&path);
        assert_eq!(
            checklist.security.hardcoded_secrets,
            vec!["private_key".to_string()]
        );
        // Unspecified fields keep their defaults.
        assert!(checklist.security.sql_injection.contains(&"sql".to_string()));
        assert_eq!(checklist.style.max_function_lines, 50);
    }
}
