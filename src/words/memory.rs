//! In-process word store

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::models::{ReviewHistoryEntry, Sm2Update, StagedUpdate, WordContent, WordRecord};
use super::store::{sort_by_due, Result, StoreError, WordStore};

#[derive(Default)]
struct MemoryState {
    words: HashMap<String, WordRecord>,
    history: Vec<ReviewHistoryEntry>,
    next_id: i64,
}

/// Word store kept entirely in memory
#[derive(Default)]
pub struct InMemoryWordStore {
    state: Mutex<MemoryState>,
}

impl InMemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding the given records as-is
    pub fn with_records(records: impl IntoIterator<Item = WordRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            for record in records {
                state.next_id = state.next_id.max(record.id);
                state.words.insert(record.word.clone(), record);
            }
        }
        store
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("word store lock poisoned".to_string()))
    }

    /// Add a new word with default scheduling fields
    pub fn add_word(
        &self,
        word: &str,
        content: WordContent,
        date_added: NaiveDate,
    ) -> Result<WordRecord> {
        let mut state = self.lock()?;
        if state.words.contains_key(word) {
            return Err(StoreError::Duplicate(word.to_string()));
        }

        state.next_id += 1;
        let record = WordRecord::new(state.next_id, word.to_string(), content, date_added);
        state.words.insert(word.to_string(), record.clone());
        Ok(record)
    }

    /// Remove a word; returns whether it existed
    pub fn delete_word(&self, word: &str) -> Result<bool> {
        Ok(self.lock()?.words.remove(word).is_some())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.words.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WordStore for InMemoryWordStore {
    fn get(&self, word: &str) -> Result<Option<WordRecord>> {
        Ok(self.lock()?.words.get(word).cloned())
    }

    fn get_all(&self) -> Result<Vec<WordRecord>> {
        let mut records: Vec<WordRecord> = self.lock()?.words.values().cloned().collect();
        sort_by_due(&mut records);
        Ok(records)
    }

    fn apply_staged_update(&self, word: &str, update: &StagedUpdate) -> Result<()> {
        let mut state = self.lock()?;
        let record = state
            .words
            .get_mut(word)
            .ok_or_else(|| StoreError::NotFound(word.to_string()))?;
        record.apply_staged(update);

        let entry = ReviewHistoryEntry {
            word_id: record.id,
            date: update.reviewed_on,
            rating: update.history_rating(),
        };
        state.history.push(entry);
        Ok(())
    }

    fn apply_sm2_update(&self, word: &str, update: &Sm2Update) -> Result<()> {
        let mut state = self.lock()?;
        let record = state
            .words
            .get_mut(word)
            .ok_or_else(|| StoreError::NotFound(word.to_string()))?;
        record.apply_sm2(update);

        let entry = ReviewHistoryEntry {
            word_id: record.id,
            date: update.reviewed_on,
            rating: update.rating.value() as i64,
        };
        state.history.push(entry);
        Ok(())
    }

    fn history(&self, word: &str) -> Result<Vec<ReviewHistoryEntry>> {
        let state = self.lock()?;
        let Some(record) = state.words.get(word) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<ReviewHistoryEntry> = state
            .history
            .iter()
            .filter(|entry| entry.word_id == record.id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }

    fn heatmap(&self, since: NaiveDate) -> Result<BTreeMap<NaiveDate, usize>> {
        let state = self.lock()?;
        let mut counts = BTreeMap::new();
        for entry in state.history.iter().filter(|entry| entry.date >= since) {
            *counts.entry(entry.date).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
