//! CodeGate Instruction Lifecycle
//!
//! The versioned, content-hashed, auditable unit of work at the center
//! of the human-gated pipeline.
//!
//! # Core Concepts
//!
//! - [`Instruction`]: the persisted entity - requirements, status,
//!   version, content hash, append-only review trail
//! - [`InstructionStatus`]: closed lifecycle enum with an explicit
//!   transition table ([`allowed_transitions`], [`validate_transition`])
//! - [`InstructionManager`]: in-memory index with synchronous
//!   write-through to a [`codegate_store::RecordStore`]
//! - [`ContentHash`]: Blake3 digest over `{function_name, requirements}`
//!
//! # Example
//!
//! ```rust,ignore
//! use codegate_instruction::InstructionManager;
//!
//! let mut manager = InstructionManager::with_dir("data/instructions")?;
//! let id = manager
//!     .create("parse_date", serde_json::json!({"input": "str"}))?
//!     .id()
//!     .to_string();
//! manager.submit_for_review(&id)?;
//! manager.approve(&id, "alice")?;
//! ```

mod error;
mod hash;
mod instruction;
mod manager;
mod status;

pub use error::InstructionError;
pub use hash::{ContentHash, HashError};
pub use instruction::{Instruction, ReviewComment};
pub use manager::InstructionManager;
pub use status::{allowed_transitions, validate_transition, InstructionStatus};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
