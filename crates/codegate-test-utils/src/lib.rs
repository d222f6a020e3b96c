//! Testing utilities for the CodeGate workspace
//!
//! Shared fixtures: temp-dir managers, sample requirement documents,
//! and pre-staged instructions.

#![allow(missing_docs)]

use codegate_instruction::InstructionManager;
use codegate_store::MemoryStore;
use serde_json::{json, Value};
use tempfile::TempDir;

/// A requirements document shaped like the production templates.
pub fn sample_requirements() -> Value {
    json!({
        "description": "Parse an ISO-8601 date string",
        "inputs": {"value": "str"},
        "output": "datetime.date",
        "error_handling": "raise ValueError on malformed input",
        "constraints": ["no external dependencies", "type hints required"]
    })
}

/// Manager over an in-memory store; fastest option for unit-style tests.
pub fn memory_manager() -> InstructionManager {
    InstructionManager::new(Box::new(MemoryStore::new())).unwrap()
}

/// Manager over a file store in a fresh temp dir.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn temp_manager() -> (InstructionManager, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let manager = InstructionManager::with_dir(dir.path().join("instructions")).unwrap();
    (manager, dir)
}

/// Create, submit, and approve one instruction; returns its id.
pub fn approved_instruction(manager: &mut InstructionManager, function_name: &str) -> String {
    let id = manager
        .create(function_name, sample_requirements())
        .unwrap()
        .id()
        .to_string();
    manager.submit_for_review(&id).unwrap();
    manager.approve(&id, "fixture-approver").unwrap();
    id
}

/// A small, well-formed Python artifact that passes the gate cleanly.
pub fn clean_artifact() -> &'static str {
    "def parse_date(value):\n    \"\"\"Parse an ISO-8601 date string.\"\"\"\n    import datetime\n    return datetime.date.fromisoformat(value)\n"
}
