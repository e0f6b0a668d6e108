//! Working set of words for one review session
//!
//! The queue owns its lock: every read of the head, pop and re-insert goes
//! through the same mutex, so two grading signals racing for one head can
//! never pop twice.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::words::WordRecord;

/// Pick the words a session should cover
///
/// Outside cram mode a word is included when it is not mastered and is
/// either new (`next_review_time == 0`) or overdue. Cram mode includes
/// every word.
pub fn select_due(records: Vec<WordRecord>, now: f64, cram: bool) -> Vec<WordRecord> {
    if cram {
        return records;
    }
    records.into_iter().filter(|r| r.is_due(now)).collect()
}

/// What to do with the head after it was graded
#[derive(Debug, Clone)]
pub enum Advance {
    /// Recalled: count it and drop it
    Completed,
    /// Failed: put the re-fetched record back for another pass
    Requeue(WordRecord),
    /// The record disappeared from the store
    Drop,
}

/// What actually happened to the head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advanced {
    Completed,
    /// Re-inserted at this index
    Requeued(usize),
    Dropped,
    /// The head was not the expected word; nothing changed
    Stale,
}

/// Progress through a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Queue size when the session started
    pub total: usize,
    /// Successful gradings so far
    pub completed: usize,
    /// Cards still queued, re-inserted failures included
    pub remaining: usize,
}

impl Progress {
    /// `completed / total`, or 1.0 for an empty session
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

struct QueueState {
    items: Vec<WordRecord>,
    completed: usize,
    rng: StdRng,
}

pub struct ReviewQueue {
    state: Mutex<QueueState>,
    total: usize,
}

impl ReviewQueue {
    /// Select due words and shuffle them
    pub fn build(records: Vec<WordRecord>, now: f64, cram: bool, mut rng: StdRng) -> Self {
        let mut items = select_due(records, now, cram);
        items.shuffle(&mut rng);
        Self::ordered(items, rng)
    }

    /// Queue the given records in the given order
    pub fn ordered(items: Vec<WordRecord>, rng: StdRng) -> Self {
        let total = items.len();
        Self {
            state: Mutex::new(QueueState {
                items,
                completed: 0,
                rng,
            }),
            total,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current head
    pub fn head(&self) -> Option<WordRecord> {
        self.lock().items.first().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn progress(&self) -> Progress {
        let state = self.lock();
        Progress {
            total: self.total,
            completed: state.completed,
            remaining: state.items.len(),
        }
    }

    /// Words in queue order
    pub fn words(&self) -> Vec<String> {
        self.lock().items.iter().map(|r| r.word.clone()).collect()
    }

    /// Pop the graded head and apply `advance`
    ///
    /// The pop only happens if the head is still `word`. A failed word goes
    /// back at a uniformly random index in `1..=len` (index 0 when the queue
    /// is otherwise empty) so it never comes straight back.
    pub fn advance(&self, word: &str, advance: Advance) -> Advanced {
        let mut state = self.lock();

        match state.items.first() {
            Some(head) if head.word == word => {}
            _ => return Advanced::Stale,
        }
        state.items.remove(0);

        match advance {
            Advance::Completed => {
                state.completed += 1;
                Advanced::Completed
            }
            Advance::Requeue(record) => {
                let len = state.items.len();
                let position = if len == 0 {
                    0
                } else {
                    state.rng.gen_range(1..=len)
                };
                state.items.insert(position, record);
                Advanced::Requeued(position)
            }
            Advance::Drop => Advanced::Dropped,
        }
    }
}
