//! # Literal Validation
//!
//! The model sometimes emits plausible but wrongly cased literals (`'female'`,
//! `'DIABETES'`). This stage rewrites whole-word, case-insensitive matches of values
//! already stored in the database to their stored spelling. It is a best-effort text
//! substitution, not a SQL parser: structure, tables and columns are never checked.

use crate::providers::db::storage::Storage;
use regex::{NoExpand, Regex};
use tracing::{debug, warn};

/// The value categories whose stored spellings are enforced.
///
/// The declaration order is the order in which rewrites are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralCategory {
    Gender,
    Disease,
    Medicine,
    Doctor,
}

impl LiteralCategory {
    pub const ALL: [LiteralCategory; 4] = [
        LiteralCategory::Gender,
        LiteralCategory::Disease,
        LiteralCategory::Medicine,
        LiteralCategory::Doctor,
    ];

    /// The `(table, column)` pair holding the canonical values.
    pub fn source(&self) -> (&'static str, &'static str) {
        match self {
            LiteralCategory::Gender => ("patients", "gender"),
            LiteralCategory::Disease => ("diseases", "name"),
            LiteralCategory::Medicine => ("medicines", "medicine_name"),
            LiteralCategory::Doctor => ("doctors", "name"),
        }
    }
}

/// A per-request snapshot of the distinct values stored for each category.
#[derive(Debug, Clone, Default)]
pub struct CanonicalLiterals {
    sets: Vec<(LiteralCategory, Vec<String>)>,
}

impl CanonicalLiterals {
    /// Builds a snapshot from explicit values, in category order.
    pub fn new(sets: Vec<(LiteralCategory, Vec<String>)>) -> Self {
        let mut sets = sets;
        sets.sort_by_key(|(category, _)| {
            LiteralCategory::ALL
                .iter()
                .position(|c| c == category)
                .unwrap_or(usize::MAX)
        });
        Self { sets }
    }

    /// Reads the current distinct values of every category from the store.
    ///
    /// A category whose lookup fails is skipped with a warning.
    pub async fn fetch(storage: &dyn Storage) -> Self {
        let mut sets = Vec::with_capacity(LiteralCategory::ALL.len());
        for category in LiteralCategory::ALL {
            let (table, column) = category.source();
            match storage.distinct_values(table, column).await {
                Ok(values) => {
                    debug!(?category, count = values.len(), "Loaded canonical literals.");
                    sets.push((category, values));
                }
                Err(e) => {
                    warn!(?category, "Skipping literal validation for category: {e}");
                }
            }
        }
        Self { sets }
    }

    /// Returns the values loaded for a category, if any.
    pub fn values(&self, category: LiteralCategory) -> Option<&[String]> {
        self.sets
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, values)| values.as_slice())
    }

    /// Rewrites every known literal in `sql` to its canonical spelling.
    pub fn apply(&self, sql: &str) -> String {
        let mut rewritten = sql.to_string();
        for (_, values) in &self.sets {
            for literal in values {
                let Some(re) = literal_pattern(literal) else {
                    continue;
                };
                rewritten = re
                    .replace_all(&rewritten, NoExpand(literal.as_str()))
                    .into_owned();
            }
        }
        rewritten
    }
}

/// Builds the case-insensitive, whole-word pattern for a literal.
///
/// A boundary anchor is only placed on a side whose edge character is a word
/// character; `\b` next to punctuation would never match where it should.
fn literal_pattern(literal: &str) -> Option<Regex> {
    let first = literal.chars().next()?;
    let last = literal.chars().next_back()?;
    if literal.trim().is_empty() {
        return None;
    }

    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let prefix = if is_word(first) { r"\b" } else { "" };
    let suffix = if is_word(last) { r"\b" } else { "" };
    let pattern = format!("(?i){prefix}{}{suffix}", regex::escape(literal));

    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(literal = %literal, "Could not build literal pattern: {e}");
            None
        }
    }
}

/// Fetches the canonical literals and applies them to `sql` in one step.
pub async fn validate_literals(storage: &dyn Storage, sql: &str) -> String {
    let literals = CanonicalLiterals::fetch(storage).await;
    let validated = literals.apply(sql);
    if validated != sql {
        debug!(before = %sql, after = %validated, "Rewrote literals in generated SQL.");
    }
    validated
}
