//! Scalar SQL functions registered on every Folio connection.
//!
//! SQLite's built-in `LIKE`/`lower()` only fold ASCII, so substring filters
//! go through `folio_contains(haystack, needle)` which folds with Rust's
//! Unicode-aware lowercase.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

pub(crate) const CONTAINS_FN_NAME: &str = "folio_contains";

/// Returns whether `needle` occurs in `haystack`, ignoring case.
///
/// An empty needle matches everything.
pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub(crate) fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_FN_NAME,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<Option<String>>(1)?;
            Ok(match (haystack, needle) {
                (Some(haystack), Some(needle)) => contains_case_insensitive(&haystack, &needle),
                _ => false,
            })
        },
    )
}
