//! Spaced-repetition review of vocabulary words
//!
//! Words are scheduled with either the staged interval table or SM-2, and
//! reviewed through a session controller that owns a shuffled queue.

pub mod config;
pub mod review;
pub mod scheduling;
pub mod words;
