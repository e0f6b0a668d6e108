//! The persistence contract the review engine depends on

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::models::{ReviewHistoryEntry, Sm2Update, StagedUpdate, WordRecord};
use crate::scheduling::SchedulingError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Word not found: {0}")]
    NotFound(String),

    #[error("Word already exists: {0}")]
    Duplicate(String),

    #[error("Invalid stored value: {0}")]
    Invalid(#[from] SchedulingError),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Record store keyed by word
///
/// Each update touches a single record and must be durable when it returns
/// `Ok`; the review session advances its queue only after that.
pub trait WordStore: Send + Sync {
    fn get(&self, word: &str) -> Result<Option<WordRecord>>;

    /// All words, soonest `next_review_time` first
    fn get_all(&self) -> Result<Vec<WordRecord>>;

    /// Persist a staged grading, bump `review_count` and log history
    fn apply_staged_update(&self, word: &str, update: &StagedUpdate) -> Result<()>;

    /// Persist an SM-2 grading, bump `review_count` and log history
    fn apply_sm2_update(&self, word: &str, update: &Sm2Update) -> Result<()>;

    /// Review history of one word, oldest first
    fn history(&self, word: &str) -> Result<Vec<ReviewHistoryEntry>>;

    /// Number of gradings per day on or after `since`
    fn heatmap(&self, since: NaiveDate) -> Result<BTreeMap<NaiveDate, usize>>;
}

/// Order used by `WordStore::get_all`
pub(crate) fn sort_by_due(records: &mut [WordRecord]) {
    records.sort_by(|a, b| a.next_review_time.total_cmp(&b.next_review_time));
}
