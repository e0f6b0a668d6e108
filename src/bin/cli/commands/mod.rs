pub mod add;
pub mod list;
pub mod manage;
pub mod review;
pub mod show;
pub mod stats;

use chrono::{DateTime, Local};

use vocab_lib::words::WordRecord;

/// Human description of when a word is next due
pub fn describe_due(record: &WordRecord, now: f64) -> String {
    if record.mastered {
        return "mastered".to_string();
    }
    if record.next_review_time == 0.0 {
        return "new".to_string();
    }
    if record.next_review_time <= now {
        return "due".to_string();
    }

    match DateTime::from_timestamp(record.next_review_time as i64, 0) {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => format!("{:.0}", record.next_review_time),
    }
}
