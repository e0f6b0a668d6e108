//! Review sessions over due words
//!
//! This module provides:
//! - Due-set selection and the shuffled, lock-guarded review queue
//! - The per-card session controller shared by flashcard and spelling review
//! - An injectable clock

mod clock;
mod error;
pub mod queue;
pub mod session;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, ReviewError};
pub use queue::{select_due, Advance, Advanced, Progress, ReviewQueue};
pub use session::{
    answers_match, AnswerCheck, CardPhase, CardView, GradeOutcome, GradeSignal, ReviewMethod,
    ReviewSession, SessionOptions, SessionSummary, Ticket,
};
