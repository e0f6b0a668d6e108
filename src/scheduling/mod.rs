//! Spaced repetition scheduling for vocabulary words
//!
//! Two schemes share one persisted record:
//! - the legacy staged-interval scheme (`1, 2, 4, 7, 15, 30` days)
//! - SM-2, which seeds itself from a legacy stage on first use
//!
//! Everything here is pure: callers pass the current time in.

pub mod algorithm;
mod error;
pub mod models;

pub use algorithm::*;
pub use error::{non_negative, Result, SchedulingError};
pub use models::*;
