//! Aggregate counts over the word list

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::models::WordRecord;

/// Default heatmap window, one year plus a day
pub const HEATMAP_DAYS: i64 = 366;

/// Learning statistics for the whole vocabulary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total: usize,
    pub mastered: usize,
    pub learning: usize,
    /// Words a non-cram session started now would include
    pub due_now: usize,
    /// Unmastered words scheduled in the future
    pub scheduled_later: usize,
}

impl ReviewStats {
    pub fn from_records(records: &[WordRecord], now: f64) -> Self {
        let total = records.len();
        let mastered = records.iter().filter(|r| r.mastered).count();

        Self {
            total,
            mastered,
            learning: total - mastered,
            due_now: due_count(records, now),
            scheduled_later: scheduled_later_count(records, now),
        }
    }
}

/// Number of due words, as polled by review reminders
pub fn due_count(records: &[WordRecord], now: f64) -> usize {
    records.iter().filter(|r| r.is_due(now)).count()
}

/// Number of unmastered words waiting for a future review time
pub fn scheduled_later_count(records: &[WordRecord], now: f64) -> usize {
    records.iter().filter(|r| r.is_scheduled_later(now)).count()
}

/// First day included in the heatmap ending on `today`
pub fn heatmap_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(HEATMAP_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordContent;

    fn record(word: &str, next_review_time: f64, mastered: bool) -> WordRecord {
        let mut r = WordRecord::new(
            0,
            word.to_string(),
            WordContent::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        r.next_review_time = next_review_time;
        r.mastered = mastered;
        r
    }

    #[test]
    fn test_stats() {
        let records = vec![
            record("new", 0.0, false),
            record("overdue", 50.0, false),
            record("later", 500.0, false),
            record("mastered", 0.0, true),
            record("mastered-later", 900.0, true),
        ];
        let stats = ReviewStats::from_records(&records, 100.0);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.mastered, 2);
        assert_eq!(stats.learning, 3);
        assert_eq!(stats.due_now, 2);
        assert_eq!(stats.scheduled_later, 1);
    }

    #[test]
    fn test_heatmap_start() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(heatmap_start(today), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }
}
