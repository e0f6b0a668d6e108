//! Data models for vocabulary words and their review history

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scheduling::{
    classify, Quality, Scheme, Sm2Result, Sm2State, StagedResult, DEFAULT_EASINESS,
};

/// Dictionary content attached to a word. Scheduling never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordContent {
    #[serde(default)]
    pub phonetic: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub example: String,
    /// Sentence the word was met in
    #[serde(default)]
    pub context_en: String,
    /// Translation of `context_en`
    #[serde(default)]
    pub context_cn: String,
    #[serde(default)]
    pub roots: String,
    #[serde(default)]
    pub synonyms: String,
    /// Comma-separated exam tags (CET4, GRE, ...)
    #[serde(default)]
    pub tags: String,
}

/// One vocabulary word, keyed by `word`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: i64,
    pub word: String,
    #[serde(flatten)]
    pub content: WordContent,
    pub date_added: NaiveDate,

    /// Legacy staged-interval counter
    #[serde(default)]
    pub stage: u32,
    /// SM-2 E-Factor, never below 1.3
    #[serde(default = "default_easiness")]
    pub easiness: f64,
    /// SM-2 interval in days
    #[serde(default)]
    pub interval: u32,
    /// SM-2 consecutive successes
    #[serde(default)]
    pub repetitions: u32,
    /// Unix seconds; 0 means never graded or unscheduled
    #[serde(default)]
    pub next_review_time: f64,
    /// Total gradings
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub mastered: bool,
}

fn default_easiness() -> f64 {
    DEFAULT_EASINESS
}

impl WordRecord {
    pub fn new(id: i64, word: String, content: WordContent, date_added: NaiveDate) -> Self {
        Self {
            id,
            word,
            content,
            date_added,
            stage: 0,
            easiness: DEFAULT_EASINESS,
            interval: 0,
            repetitions: 0,
            next_review_time: 0.0,
            review_count: 0,
            mastered: false,
        }
    }

    pub fn sm2_state(&self) -> Sm2State {
        Sm2State {
            easiness: self.easiness,
            interval: self.interval,
            repetitions: self.repetitions,
        }
    }

    pub fn scheme(&self) -> Scheme {
        classify(self.sm2_state(), self.stage)
    }

    /// Due for ordinary review: not mastered and either new or overdue
    pub fn is_due(&self, now: f64) -> bool {
        !self.mastered && (self.next_review_time == 0.0 || self.next_review_time <= now)
    }

    /// Not mastered and scheduled strictly in the future
    pub fn is_scheduled_later(&self, now: f64) -> bool {
        !self.mastered && self.next_review_time > now
    }

    pub fn apply_staged(&mut self, update: &StagedUpdate) {
        self.stage = update.stage;
        self.next_review_time = update.next_review_time;
        self.mastered = update.mastered;
        self.review_count += 1;
    }

    pub fn apply_sm2(&mut self, update: &Sm2Update) {
        self.easiness = update.easiness;
        self.interval = update.interval;
        self.repetitions = update.repetitions;
        self.next_review_time = update.next_review_time;
        self.mastered = update.mastered;
        self.review_count += 1;
    }
}

/// Write-through for a staged-interval grading
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpdate {
    pub stage: u32,
    pub next_review_time: f64,
    pub mastered: bool,
    pub reviewed_on: NaiveDate,
}

impl StagedUpdate {
    pub fn new(result: StagedResult, reviewed_on: NaiveDate) -> Self {
        Self {
            stage: result.stage,
            next_review_time: result.next_review_time,
            mastered: result.mastered,
            reviewed_on,
        }
    }

    /// History rating: 1 when the stage advanced, 0 when it reset
    pub fn history_rating(&self) -> i64 {
        if self.stage > 0 {
            1
        } else {
            0
        }
    }
}

/// Write-through for an SM-2 grading
#[derive(Debug, Clone, PartialEq)]
pub struct Sm2Update {
    pub easiness: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub next_review_time: f64,
    pub mastered: bool,
    pub rating: Quality,
    pub reviewed_on: NaiveDate,
}

impl Sm2Update {
    pub fn new(result: Sm2Result, rating: Quality, reviewed_on: NaiveDate) -> Self {
        Self {
            easiness: result.easiness,
            interval: result.interval,
            repetitions: result.repetitions,
            next_review_time: result.next_review_time,
            mastered: result.mastered,
            rating,
            reviewed_on,
        }
    }
}

/// One grading event, kept for the heatmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewHistoryEntry {
    pub word_id: i64,
    pub date: NaiveDate,
    /// SM-2 quality, or 0/1 for staged gradings
    pub rating: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> WordRecord {
        WordRecord::new(
            1,
            "ephemeral".to_string(),
            WordContent::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_new_record_defaults() {
        let r = record();
        assert_eq!(r.stage, 0);
        assert_eq!(r.easiness, 2.5);
        assert_eq!(r.interval, 0);
        assert_eq!(r.repetitions, 0);
        assert_eq!(r.next_review_time, 0.0);
        assert!(!r.mastered);
        assert_eq!(r.scheme(), Scheme::New);
    }

    #[test]
    fn test_is_due() {
        let mut r = record();
        assert!(r.is_due(1_000.0));

        r.next_review_time = 1_000.0;
        assert!(r.is_due(1_000.0));
        assert!(!r.is_due(999.0));
        assert!(r.is_scheduled_later(999.0));

        r.mastered = true;
        assert!(!r.is_due(5_000.0));
        assert!(!r.is_scheduled_later(999.0));
    }

    #[test]
    fn test_staged_history_rating() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let advanced = StagedUpdate {
            stage: 2,
            next_review_time: 10.0,
            mastered: false,
            reviewed_on: date,
        };
        assert_eq!(advanced.history_rating(), 1);

        let reset = StagedUpdate { stage: 0, ..advanced };
        assert_eq!(reset.history_rating(), 0);
    }

    #[test]
    fn test_apply_counts_reviews() {
        let mut r = record();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        r.apply_staged(&StagedUpdate {
            stage: 1,
            next_review_time: 86_400.0,
            mastered: false,
            reviewed_on: date,
        });
        r.apply_sm2(&Sm2Update {
            easiness: 2.6,
            interval: 4,
            repetitions: 2,
            next_review_time: 90_000.0,
            mastered: false,
            rating: Quality::FAMILIAR,
            reviewed_on: date,
        });
        assert_eq!(r.review_count, 2);
        assert_eq!(r.stage, 1);
        assert_eq!(r.interval, 4);
    }

    #[test]
    fn test_deserialize_with_missing_schedule_fields() {
        let json = r#"{"id": 3, "word": "lucid", "meaning": "clear", "dateAdded": "2024-02-02"}"#;
        let r: WordRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.content.meaning, "clear");
        assert_eq!(r.easiness, 2.5);
        assert_eq!(r.next_review_time, 0.0);
    }
}
