//! One review session: present, reveal, grade, advance
//!
//! Both review methods share the same card lifecycle:
//!
//! ```text
//! Presenting --reveal / check_answer--> Revealed --grade--> Presenting (next head)
//!                                                       \-> Finished
//! ```
//!
//! Every presented card gets a fresh `Ticket`. A grade carrying an old
//! ticket, or arriving before the card is revealed, is ignored, so a
//! duplicated signal never grades twice. Grading a finished session is an
//! error (`ReviewError::EmptyQueue`). The store write completes before
//! the queue advances; if it fails the card stays where it is.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clock::Clock;
use super::error::{ReviewError, Result};
use super::queue::{Advance, Advanced, Progress, ReviewQueue};
use crate::scheduling::{calculate_sm2, calculate_staged, Quality, SchedulingError};
use crate::words::{
    scheduled_later_count, Sm2Update, StagedUpdate, StoreError, WordRecord, WordStore,
};

/// Characters ignored at either end of a typed answer
const ANSWER_PUNCTUATION: &[char] = &['.', ',', ';', '?', '!'];

/// How a card gets from `Presenting` to `Revealed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMethod {
    /// Flashcard: the meaning is revealed on request
    #[default]
    Recognition,
    /// Spelling: the answer is revealed after a typed attempt is checked
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub method: ReviewMethod,
    /// Include every word regardless of due time or mastery
    pub cram: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardPhase {
    /// Front shown, answer hidden
    Presenting,
    /// Answer shown, grading accepted
    Revealed,
    /// Queue exhausted
    Finished,
}

/// Identifies one presentation of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket(u64);

/// Result of comparing a typed answer with the word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCheck {
    pub correct: bool,
    pub expected: String,
    pub given: String,
}

/// Snapshot of the card in front of the user
#[derive(Debug, Clone)]
pub struct CardView {
    pub ticket: Ticket,
    pub phase: CardPhase,
    pub record: WordRecord,
    pub answer: Option<AnswerCheck>,
}

/// Grading signal for the current card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeSignal {
    /// SM-2 rating from the flashcard buttons
    Quality(Quality),
    /// Right/wrong, scheduled with the staged intervals
    Recall(bool),
}

impl GradeSignal {
    /// Validate a raw SM-2 rating
    pub fn quality(value: i64) -> std::result::Result<Self, SchedulingError> {
        Ok(Self::Quality(Quality::new(value)?))
    }

    pub fn is_success(self) -> bool {
        match self {
            Self::Quality(quality) => quality.is_success(),
            Self::Recall(ok) => ok,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeOutcome {
    /// Recalled and counted
    Completed,
    /// Failed and re-inserted at this queue index
    Requeued { position: usize },
    /// The word no longer exists in the store and left the session
    Dropped,
    /// Stale ticket or card not revealed; nothing happened
    Ignored,
}

/// Facts a host needs to render the end of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub total: usize,
    pub completed: usize,
    /// Unmastered words whose review time is still ahead
    pub scheduled_later: usize,
    pub cram: bool,
}

/// Compare a typed answer with the canonical word
///
/// Case-insensitive; surrounding whitespace and `.,;?!` are ignored on both
/// sides.
pub fn answers_match(given: &str, expected: &str) -> bool {
    normalize_answer(given) == normalize_answer(expected)
}

fn normalize_answer(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .trim_matches(ANSWER_PUNCTUATION)
        .to_string()
}

struct CardState {
    ticket: u64,
    phase: CardPhase,
    answer: Option<AnswerCheck>,
}

pub struct ReviewSession {
    id: Uuid,
    options: SessionOptions,
    store: Arc<dyn WordStore>,
    clock: Arc<dyn Clock>,
    queue: ReviewQueue,
    card: Mutex<CardState>,
}

impl ReviewSession {
    /// Build the queue from the store's current word list
    pub fn start(
        store: Arc<dyn WordStore>,
        clock: Arc<dyn Clock>,
        options: SessionOptions,
        rng: StdRng,
    ) -> Result<Self> {
        let records = store.get_all()?;
        let queue = ReviewQueue::build(records, clock.now_seconds(), options.cram, rng);
        Ok(Self::with_queue(store, clock, options, queue))
    }

    /// Run a session over an already built queue
    pub fn with_queue(
        store: Arc<dyn WordStore>,
        clock: Arc<dyn Clock>,
        options: SessionOptions,
        queue: ReviewQueue,
    ) -> Self {
        let id = Uuid::new_v4();
        let phase = if queue.is_empty() {
            CardPhase::Finished
        } else {
            CardPhase::Presenting
        };
        log::info!(
            "Review session {} started: {} cards, method {:?}, cram {}",
            id,
            queue.total(),
            options.method,
            options.cram
        );

        Self {
            id,
            options,
            store,
            clock,
            queue,
            card: Mutex::new(CardState {
                ticket: 0,
                phase,
                answer: None,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    fn lock_card(&self) -> MutexGuard<'_, CardState> {
        self.card.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_finished(&self) -> bool {
        self.lock_card().phase == CardPhase::Finished
    }

    pub fn progress(&self) -> Progress {
        self.queue.progress()
    }

    /// The card in front of the user
    ///
    /// Returns `ReviewError::EmptyQueue` once the session is finished.
    pub fn current(&self) -> Result<CardView> {
        let card = self.lock_card();
        let record = self.queue.head().ok_or(ReviewError::EmptyQueue)?;
        Ok(CardView {
            ticket: Ticket(card.ticket),
            phase: card.phase,
            record,
            answer: card.answer.clone(),
        })
    }

    /// Show the answer of a recognition card
    ///
    /// Returns whether the card moved to `Revealed`.
    pub fn reveal(&self, ticket: Ticket) -> Result<bool> {
        let mut card = self.lock_card();
        if card.phase == CardPhase::Finished {
            return Err(ReviewError::EmptyQueue);
        }
        if self.options.method != ReviewMethod::Recognition
            || card.ticket != ticket.0
            || card.phase != CardPhase::Presenting
        {
            return Ok(false);
        }

        card.phase = CardPhase::Revealed;
        Ok(true)
    }

    /// Check a typed answer for a production card and reveal it
    ///
    /// Returns `None` when the ticket is stale or the card was already
    /// checked.
    pub fn check_answer(&self, ticket: Ticket, given: &str) -> Result<Option<AnswerCheck>> {
        let mut card = self.lock_card();
        if card.phase == CardPhase::Finished {
            return Err(ReviewError::EmptyQueue);
        }
        if card.ticket != ticket.0 || card.phase != CardPhase::Presenting {
            return Ok(None);
        }

        let record = self.queue.head().ok_or(ReviewError::EmptyQueue)?;
        let check = AnswerCheck {
            correct: answers_match(given, &record.word),
            expected: record.word.trim().to_string(),
            given: given.trim().to_string(),
        };

        card.phase = CardPhase::Revealed;
        card.answer = Some(check.clone());
        Ok(Some(check))
    }

    /// Grade a checked production card with its own verdict
    pub fn confirm(&self, ticket: Ticket) -> Result<GradeOutcome> {
        let verdict = {
            let card = self.lock_card();
            if card.phase == CardPhase::Finished {
                return Err(ReviewError::EmptyQueue);
            }
            card.answer.as_ref().map(|a| a.correct)
        };
        match verdict {
            Some(correct) => self.grade(ticket, GradeSignal::Recall(correct)),
            None => Ok(GradeOutcome::Ignored),
        }
    }

    /// Grade the revealed card, persist it and move to the next one
    pub fn grade(&self, ticket: Ticket, signal: GradeSignal) -> Result<GradeOutcome> {
        // Held until the queue has advanced; concurrent graders wait here
        let mut card = self.lock_card();
        if card.phase == CardPhase::Finished {
            return Err(ReviewError::EmptyQueue);
        }
        if card.ticket != ticket.0 || card.phase != CardPhase::Revealed {
            log::debug!("Session {}: ignoring grade for ticket {}", self.id, ticket.0);
            return Ok(GradeOutcome::Ignored);
        }

        let head = self.queue.head().ok_or(ReviewError::EmptyQueue)?;
        let word = head.word.clone();

        let written = match self.write_through(&head, signal) {
            Ok(updated) => Some(updated),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Session {}: failed to save review of '{}': {}", self.id, word, e);
                return Err(e.into());
            }
        };

        let advance = match written {
            None => {
                log::warn!("Session {}: '{}' vanished from the store, dropping it", self.id, word);
                Advance::Drop
            }
            Some(_) if signal.is_success() => Advance::Completed,
            Some(updated) => match self.store.get(&word) {
                Ok(Some(fresh)) => Advance::Requeue(fresh),
                Ok(None) => {
                    log::warn!(
                        "Session {}: '{}' vanished after grading, dropping it",
                        self.id,
                        word
                    );
                    Advance::Drop
                }
                Err(e) => {
                    log::warn!(
                        "Session {}: could not re-fetch '{}' ({}), requeueing local copy",
                        self.id,
                        word,
                        e
                    );
                    Advance::Requeue(updated)
                }
            },
        };

        let outcome = match self.queue.advance(&word, advance) {
            Advanced::Completed => GradeOutcome::Completed,
            Advanced::Requeued(position) => GradeOutcome::Requeued { position },
            Advanced::Dropped => GradeOutcome::Dropped,
            Advanced::Stale => GradeOutcome::Ignored,
        };
        log::debug!("Session {}: graded '{}' with {:?} -> {:?}", self.id, word, signal, outcome);

        card.ticket += 1;
        card.answer = None;
        card.phase = if self.queue.is_empty() {
            log::info!("Review session {} finished", self.id);
            CardPhase::Finished
        } else {
            CardPhase::Presenting
        };

        Ok(outcome)
    }

    /// Run the scheduler for `signal` and persist the result
    ///
    /// Returns the head as it now looks in the store.
    fn write_through(
        &self,
        head: &WordRecord,
        signal: GradeSignal,
    ) -> std::result::Result<WordRecord, StoreError> {
        let now = self.clock.now();
        let today = self.clock.today();
        let mut updated = head.clone();

        match signal {
            GradeSignal::Quality(quality) => {
                let result = calculate_sm2(head.sm2_state(), head.stage, quality, now);
                let update = Sm2Update::new(result, quality, today);
                self.store.apply_sm2_update(&head.word, &update)?;
                updated.apply_sm2(&update);
            }
            GradeSignal::Recall(ok) => {
                let result = calculate_staged(ok, head.stage, now);
                let update = StagedUpdate::new(result, today);
                self.store.apply_staged_update(&head.word, &update)?;
                updated.apply_staged(&update);
            }
        }

        Ok(updated)
    }

    /// Completion facts, computed against the full word list
    pub fn summary(&self) -> Result<SessionSummary> {
        let records = self.store.get_all()?;
        let progress = self.queue.progress();

        Ok(SessionSummary {
            session_id: self.id,
            total: progress.total,
            completed: progress.completed,
            scheduled_later: scheduled_later_count(&records, self.clock.now_seconds()),
            cram: self.options.cram,
        })
    }
}
