//! Domain model for owners, projects, documents and their revision history.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own pure input validation for user and project fields.
//!
//! # Invariants
//! - Every project owns exactly one document.
//! - History entries are immutable snapshots; deletion only happens through
//!   the owning project's cascade.

pub mod document;
pub mod identity;
pub mod page;
pub mod project;
pub mod user;

use chrono::Utc;

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
