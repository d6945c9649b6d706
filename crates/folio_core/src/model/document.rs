//! Document and revision history records.
//!
//! # Invariants
//! - One document per project; `project_id` never changes.
//! - `last_modified` moves only when content actually changes.
//! - A `HistoryEntry` stores the full pre-update content and is never edited.

use crate::model::project::ProjectId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DocumentId = Uuid;

/// Server-assigned, strictly increasing history id.
pub type HistoryId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub project_id: ProjectId,
    pub content: String,
    /// Epoch milliseconds.
    pub last_modified: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub document_id: DocumentId,
    pub content_snapshot: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Outcome of a document content write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentWrite {
    pub document: Document,
    /// `false` for no-op writes whose content matched byte-for-byte.
    pub history_entry_created: bool,
}

/// Word and character totals for one or more contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub words: u64,
    pub characters: u64,
}

impl ContentStats {
    /// Whitespace-delimited token count and Unicode scalar count.
    pub fn of(content: &str) -> Self {
        Self {
            words: content.split_whitespace().count() as u64,
            characters: content.chars().count() as u64,
        }
    }

    pub fn add(self, other: Self) -> Self {
        Self {
            words: self.words + other.words,
            characters: self.characters + other.characters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ContentStats;

    #[test]
    fn counts_whitespace_tokens_and_chars() {
        let stats = ContentStats::of("  hello\tbrave\n new  wörld ");
        assert_eq!(stats.words, 4);
        assert_eq!(stats.characters, 26);
        assert_eq!(ContentStats::of(""), ContentStats::default());
    }
}
