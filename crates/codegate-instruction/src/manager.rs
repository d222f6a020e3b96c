//! The instruction manager
//!
//! An in-memory index over every instruction, loaded once from the
//! record store at construction and kept write-through thereafter:
//! every successful mutation is synchronously persisted as one
//! whole-document overwrite.
//!
//! The manager is a pure data authority. It guards only the
//! transitions its contract requires (`mark_executed`,
//! `submit_for_review`, `begin_review`, `archive`); whether an
//! instruction may be edited or approved in its current state is the
//! calling layer's policy, checked against
//! [`crate::status::allowed_transitions`].
//!
//! The index is not safe for uncoordinated concurrent writers; the
//! system relies on a single-writer-per-process discipline rather than
//! locking.

use crate::error::InstructionError;
use crate::instruction::Instruction;
use crate::status::InstructionStatus;
use codegate_store::{FileStore, RecordStore};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// In-memory index plus write-through persistence for instructions
pub struct InstructionManager {
    store: Box<dyn RecordStore>,
    index: HashMap<String, Instruction>,
}

impl std::fmt::Debug for InstructionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstructionManager")
            .field("instructions", &self.index.len())
            .finish()
    }
}

impl InstructionManager {
    /// Build a manager over an existing store, loading every record
    ///
    /// Unreadable or corrupt records are logged and skipped; they are
    /// never deleted.
    ///
    /// # Errors
    /// Returns error if the store cannot list its keys.
    pub fn new(store: Box<dyn RecordStore>) -> Result<Self, InstructionError> {
        let index = load_all(store.as_ref())?;
        tracing::info!("instruction manager loaded: {} records", index.len());
        Ok(Self { store, index })
    }

    /// Convenience constructor over a file store rooted at `dir`
    ///
    /// # Errors
    /// Returns error if the directory cannot be created or listed.
    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self, InstructionError> {
        let store = FileStore::open(dir.as_ref())?;
        Self::new(Box::new(store))
    }

    /// Create a fresh draft instruction and persist it
    ///
    /// # Errors
    /// Fails only on requirements serialization or store failure.
    pub fn create(
        &mut self,
        function_name: impl Into<String>,
        requirements: Value,
    ) -> Result<&Instruction, InstructionError> {
        let instruction = Instruction::new(function_name, requirements)?;
        persist(self.store.as_ref(), &instruction)?;
        tracing::info!(
            "instruction created: {} - {}",
            instruction.id(),
            instruction.function_name()
        );
        let id = instruction.id().to_string();
        Ok(self.index.entry(id).or_insert(instruction))
    }

    /// Look up an instruction by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Instruction> {
        self.index.get(id)
    }

    /// Replace an instruction's requirements document
    ///
    /// Bumps the version and recomputes the hash. Returns `false` for
    /// an unknown id. Deliberately does not restrict which states may
    /// be edited.
    ///
    /// # Errors
    /// Fails on serialization or store failure.
    pub fn update(&mut self, id: &str, requirements: Value) -> Result<bool, InstructionError> {
        let Some(instruction) = self.index.get_mut(id) else {
            return Ok(false);
        };
        instruction.update_requirements(requirements)?;
        persist(self.store.as_ref(), instruction)?;
        tracing::info!("instruction updated: {} (v{})", id, instruction.version());
        Ok(true)
    }

    /// Approve an instruction
    ///
    /// The manager does not verify the prior status; the
    /// pending-review precondition is enforced by the calling layer.
    /// The approval stamp is written only on first approval.
    ///
    /// # Errors
    /// Fails on store failure.
    pub fn approve(
        &mut self,
        id: &str,
        approver: impl Into<String>,
    ) -> Result<bool, InstructionError> {
        let Some(instruction) = self.index.get_mut(id) else {
            return Ok(false);
        };
        let approver = approver.into();
        instruction.approve(approver.clone());
        persist(self.store.as_ref(), instruction)?;
        tracing::info!("instruction approved: {} by {}", id, approver);
        Ok(true)
    }

    /// Reject an instruction, recording the reason in the audit trail
    ///
    /// Idempotent in effect: a repeat call appends another comment but
    /// the status is already terminal.
    ///
    /// # Errors
    /// Fails on store failure.
    pub fn reject(
        &mut self,
        id: &str,
        reason: &str,
        reviewer: impl Into<String>,
    ) -> Result<bool, InstructionError> {
        let Some(instruction) = self.index.get_mut(id) else {
            return Ok(false);
        };
        instruction.reject(reason, reviewer);
        persist(self.store.as_ref(), instruction)?;
        tracing::warn!("instruction rejected: {} - {}", id, reason);
        Ok(true)
    }

    /// Append a review comment; no status guard
    ///
    /// # Errors
    /// Fails on store failure.
    pub fn add_comment(
        &mut self,
        id: &str,
        comment: impl Into<String>,
        reviewer: impl Into<String>,
    ) -> Result<bool, InstructionError> {
        let Some(instruction) = self.index.get_mut(id) else {
            return Ok(false);
        };
        instruction.add_review_comment(comment, reviewer);
        persist(self.store.as_ref(), instruction)?;
        Ok(true)
    }

    /// Submit a draft for review (Draft -> PendingReview)
    ///
    /// No-op returning `false` from any other state.
    ///
    /// # Errors
    /// Fails on store failure.
    pub fn submit_for_review(&mut self, id: &str) -> Result<bool, InstructionError> {
        self.guarded_transition(id, InstructionStatus::Draft, InstructionStatus::PendingReview)
    }

    /// Pick up a pending instruction (PendingReview -> UnderReview)
    ///
    /// No-op returning `false` from any other state.
    ///
    /// # Errors
    /// Fails on store failure.
    pub fn begin_review(&mut self, id: &str) -> Result<bool, InstructionError> {
        self.guarded_transition(
            id,
            InstructionStatus::PendingReview,
            InstructionStatus::UnderReview,
        )
    }

    /// Mark an approved instruction executed (Approved -> Executed)
    ///
    /// No-op returning `false` from any other state; this transition is
    /// guarded at the manager layer.
    ///
    /// # Errors
    /// Fails on store failure.
    pub fn mark_executed(&mut self, id: &str) -> Result<bool, InstructionError> {
        let executed = self.guarded_transition(
            id,
            InstructionStatus::Approved,
            InstructionStatus::Executed,
        )?;
        if executed {
            tracing::info!("instruction executed: {}", id);
        }
        Ok(executed)
    }

    /// Retire an executed instruction (Executed -> Archived)
    ///
    /// Archival is a status value; the record is never deleted.
    ///
    /// # Errors
    /// Fails on store failure.
    pub fn archive(&mut self, id: &str) -> Result<bool, InstructionError> {
        self.guarded_transition(id, InstructionStatus::Executed, InstructionStatus::Archived)
    }

    /// Every instruction currently in `status`
    #[must_use]
    pub fn query_by_status(&self, status: InstructionStatus) -> Vec<&Instruction> {
        self.index
            .values()
            .filter(|instruction| instruction.status() == status)
            .collect()
    }

    /// Instructions waiting for a reviewer
    #[must_use]
    pub fn pending_approvals(&self) -> Vec<&Instruction> {
        self.query_by_status(InstructionStatus::PendingReview)
    }

    /// Instructions approved and ready to execute
    #[must_use]
    pub fn approved(&self) -> Vec<&Instruction> {
        self.query_by_status(InstructionStatus::Approved)
    }

    /// Count per status, covering every declared status
    #[must_use]
    pub fn summary(&self) -> BTreeMap<InstructionStatus, usize> {
        InstructionStatus::ALL
            .into_iter()
            .map(|status| (status, self.query_by_status(status).len()))
            .collect()
    }

    /// Total number of instructions
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the manager holds no instructions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn guarded_transition(
        &mut self,
        id: &str,
        from: InstructionStatus,
        to: InstructionStatus,
    ) -> Result<bool, InstructionError> {
        let Some(instruction) = self.index.get_mut(id) else {
            return Ok(false);
        };
        if instruction.status() != from {
            return Ok(false);
        }
        instruction.advance(to);
        persist(self.store.as_ref(), instruction)?;
        Ok(true)
    }
}

/// Write one instruction through to the store as a whole document
fn persist(store: &dyn RecordStore, instruction: &Instruction) -> Result<(), InstructionError> {
    let document = serde_json::to_value(instruction)?;
    store.put(instruction.id(), &document)?;
    Ok(())
}

/// Load every readable record; corrupt ones are logged and skipped
fn load_all(store: &dyn RecordStore) -> Result<HashMap<String, Instruction>, InstructionError> {
    let mut index = HashMap::new();
    for key in store.list_keys()? {
        match store.get(&key) {
            Ok(Some(document)) => match serde_json::from_value::<Instruction>(document) {
                Ok(instruction) => {
                    index.insert(instruction.id().to_string(), instruction);
                }
                Err(e) => {
                    tracing::error!("skipping malformed instruction record {}: {}", key, e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::error!("skipping unreadable instruction record {}: {}", key, e);
            }
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegate_store::MemoryStore;
    use serde_json::json;

    fn manager() -> InstructionManager {
        InstructionManager::new(Box::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn create_persists_and_indexes() {
        let mut mgr = manager();
        let id = mgr.create("f", json!({"x": 1})).unwrap().id().to_string();
        assert_eq!(mgr.len(), 1);

        let found = mgr.get(&id).unwrap();
        assert_eq!(found.function_name(), "f");
        assert_eq!(found.status(), InstructionStatus::Draft);
    }

    #[test]
    fn operations_on_unknown_ids_return_false() {
        let mut mgr = manager();
        assert!(!mgr.update("nope", json!({})).unwrap());
        assert!(!mgr.approve("nope", "alice").unwrap());
        assert!(!mgr.reject("nope", "why", "alice").unwrap());
        assert!(!mgr.add_comment("nope", "hi", "alice").unwrap());
        assert!(!mgr.mark_executed("nope").unwrap());
        assert!(!mgr.archive("nope").unwrap());
        assert!(mgr.get("nope").is_none());
    }

    #[test]
    fn update_does_not_restrict_states() {
        let mut mgr = manager();
        let id = mgr.create("f", json!({"x": 1})).unwrap().id().to_string();
        mgr.approve(&id, "alice").unwrap();

        // The manager is a pure data authority; edit policy lives upstream.
        assert!(mgr.update(&id, json!({"x": 2})).unwrap());
        assert_eq!(mgr.get(&id).unwrap().version(), 2);
    }

    #[test]
    fn mark_executed_requires_approved() {
        let mut mgr = manager();
        let id = mgr.create("f", json!({})).unwrap().id().to_string();

        assert!(!mgr.mark_executed(&id).unwrap());
        assert_eq!(mgr.get(&id).unwrap().status(), InstructionStatus::Draft);

        mgr.approve(&id, "alice").unwrap();
        assert!(mgr.mark_executed(&id).unwrap());
        assert_eq!(mgr.get(&id).unwrap().status(), InstructionStatus::Executed);

        // Already executed; a second call is a no-op.
        assert!(!mgr.mark_executed(&id).unwrap());
    }

    #[test]
    fn review_entry_points_are_guarded() {
        let mut mgr = manager();
        let id = mgr.create("f", json!({})).unwrap().id().to_string();

        assert!(!mgr.begin_review(&id).unwrap());
        assert!(mgr.submit_for_review(&id).unwrap());
        assert!(!mgr.submit_for_review(&id).unwrap());
        assert_eq!(
            mgr.get(&id).unwrap().status(),
            InstructionStatus::PendingReview
        );

        assert!(mgr.begin_review(&id).unwrap());
        assert_eq!(
            mgr.get(&id).unwrap().status(),
            InstructionStatus::UnderReview
        );
    }

    #[test]
    fn archive_only_from_executed() {
        let mut mgr = manager();
        let id = mgr.create("f", json!({})).unwrap().id().to_string();

        assert!(!mgr.archive(&id).unwrap());
        mgr.approve(&id, "alice").unwrap();
        assert!(!mgr.archive(&id).unwrap());
        mgr.mark_executed(&id).unwrap();
        assert!(mgr.archive(&id).unwrap());
        assert_eq!(mgr.get(&id).unwrap().status(), InstructionStatus::Archived);
    }

    #[test]
    fn summary_covers_every_status_and_sums_to_total() {
        let mut mgr = manager();
        mgr.create("a", json!({})).unwrap();
        mgr.create("b", json!({})).unwrap();
        let c = mgr.create("c", json!({})).unwrap().id().to_string();
        mgr.approve(&c, "alice").unwrap();

        let summary = mgr.summary();
        assert_eq!(summary.len(), InstructionStatus::ALL.len());
        assert_eq!(summary[&InstructionStatus::Draft], 2);
        assert_eq!(summary[&InstructionStatus::Approved], 1);
        assert_eq!(summary[&InstructionStatus::Rejected], 0);
        assert_eq!(summary.values().sum::<usize>(), mgr.len());
    }

    #[test]
    fn query_helpers_filter_by_status() {
        let mut mgr = manager();
        let a = mgr.create("a", json!({})).unwrap().id().to_string();
        let b = mgr.create("b", json!({})).unwrap().id().to_string();
        mgr.submit_for_review(&a).unwrap();
        mgr.approve(&b, "alice").unwrap();

        assert_eq!(mgr.pending_approvals().len(), 1);
        assert_eq!(mgr.approved().len(), 1);
        assert_eq!(mgr.pending_approvals()[0].id(), a);
        assert_eq!(mgr.approved()[0].id(), b);
    }
}
