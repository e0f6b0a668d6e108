//! Data models for the scheduling engine

use serde::{Deserialize, Serialize};

use super::error::{Result, SchedulingError};

/// Fixed day table of the legacy staged scheme
pub const INTERVALS: [u32; 6] = [1, 2, 4, 7, 15, 30];

/// Minimum SM-2 easiness factor
pub const MIN_EASINESS: f64 = 1.3;

/// Easiness factor of a word that was never graded under SM-2
pub const DEFAULT_EASINESS: f64 = 2.5;

/// An SM-2 interval strictly above this many days marks a word mastered
pub const MASTERED_INTERVAL_DAYS: u32 = 180;

/// SM-2 quality rating (0-5)
///
/// - 0: Complete blackout
/// - 1: Incorrect, but the answer was recognized
/// - 2: Incorrect, but the answer seemed easy
/// - 3: Correct with serious difficulty
/// - 4: Correct after hesitation
/// - 5: Perfect recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quality(u8);

impl Quality {
    /// "Forgot" button
    pub const FORGOT: Quality = Quality(1);
    /// "Vague" button
    pub const VAGUE: Quality = Quality(3);
    /// "Familiar" button
    pub const FAMILIAR: Quality = Quality(5);

    pub fn new(value: i64) -> Result<Self> {
        if (0..=5).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SchedulingError::InvalidQuality(value))
        }
    }

    /// Map the review screen's three buttons (1 forgot, 2 vague, 3 familiar)
    pub fn from_button(button: u8) -> Option<Self> {
        match button {
            1 => Some(Self::FORGOT),
            2 => Some(Self::VAGUE),
            3 => Some(Self::FAMILIAR),
            _ => None,
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Quality 3 and above counts as a successful recall
    pub fn is_success(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<i64> for Quality {
    type Error = SchedulingError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for i64 {
    fn from(quality: Quality) -> Self {
        quality.0 as i64
    }
}

/// SM-2 fields of a word
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sm2State {
    pub easiness: f64,
    /// Days until the next review
    pub interval: u32,
    /// Consecutive successful recalls
    pub repetitions: u32,
}

impl Default for Sm2State {
    fn default() -> Self {
        Self {
            easiness: DEFAULT_EASINESS,
            interval: 0,
            repetitions: 0,
        }
    }
}

/// Result of an SM-2 grading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Result {
    pub easiness: f64,
    pub interval: u32,
    pub repetitions: u32,
    /// Unix timestamp in seconds
    pub next_review_time: f64,
    pub mastered: bool,
}

impl Sm2Result {
    pub fn state(&self) -> Sm2State {
        Sm2State {
            easiness: self.easiness,
            interval: self.interval,
            repetitions: self.repetitions,
        }
    }
}

/// Result of a staged-interval grading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagedResult {
    pub stage: u32,
    /// Unix timestamp in seconds, 0 when nothing is scheduled
    pub next_review_time: f64,
    pub mastered: bool,
}

/// Which scheme currently drives a word's schedule
///
/// The store does not tag records; this is derived from the fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Scheme {
    /// Never graded
    New,
    /// Graded only by the staged scheme; the first SM-2 grading migrates it
    Staged { stage: u32 },
    /// Owned by SM-2
    Sm2 { state: Sm2State },
}

impl Default for Scheme {
    fn default() -> Self {
        Self::New
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bounds() {
        assert!(Quality::new(0).is_ok());
        assert!(Quality::new(5).is_ok());
        assert_eq!(Quality::new(6), Err(SchedulingError::InvalidQuality(6)));
        assert_eq!(Quality::new(-1), Err(SchedulingError::InvalidQuality(-1)));
    }

    #[test]
    fn test_quality_success_boundary() {
        assert!(!Quality::new(2).unwrap().is_success());
        assert!(Quality::new(3).unwrap().is_success());
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(Quality::from_button(1), Some(Quality::FORGOT));
        assert_eq!(Quality::from_button(2).map(Quality::value), Some(3));
        assert_eq!(Quality::from_button(3).map(Quality::value), Some(5));
        assert_eq!(Quality::from_button(4), None);
    }

    #[test]
    fn test_quality_deserialize_rejects_out_of_range() {
        let ok: Quality = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Quality>("9").is_err());
    }
}
