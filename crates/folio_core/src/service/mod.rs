//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate guard checks, per-document locks and repository calls into
//!   use-case level APIs.
//! - Keep callers decoupled from storage details.
//!
//! # Invariants
//! - Every entity-addressed operation runs the ownership guard first.
//! - Validation happens before any repository write.

pub mod analytics_service;
pub mod document_service;
pub mod history_service;
pub mod project_service;
pub mod query_service;
pub mod user_service;
