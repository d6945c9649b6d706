//! Cross-cutting access control and write serialization.
//!
//! # Responsibility
//! - Resolve the transitive owner of any project/document/history entity and
//!   compare it with the acting identity.
//! - Serialize content writes and cascading deletes per document.
//!
//! # Invariants
//! - Denials are indistinguishable from missing rows.
//! - Distinct documents never contend for the same lock slot.

pub mod doc_locks;
pub mod guard;
