//! SM-2 and staged-interval scheduling
//!
//! SM-2 quality ratings run 0-5; the review screen only emits
//! 1 (forgot), 3 (vague) and 5 (familiar).
//!
//! A word graded under the staged scheme keeps its progress the first time
//! SM-2 sees it: `repetitions` is seeded from the stage and `interval` from
//! `INTERVALS[min(stage - 1, 5)]` before the SM-2 update runs.

use chrono::{DateTime, Utc};

use super::models::{
    Quality, Scheme, Sm2Result, Sm2State, StagedResult, INTERVALS, MASTERED_INTERVAL_DAYS,
    MIN_EASINESS,
};

/// Seconds since the Unix epoch, as stored in `next_review_time`
pub fn unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Plain float arithmetic so huge intervals never leave chrono's date range
fn days_from(now: DateTime<Utc>, days: u32) -> f64 {
    unix_seconds(now) + days as f64 * SECONDS_PER_DAY
}

/// Seed SM-2 fields from a legacy stage when SM-2 has never counted a success
pub fn migrate_legacy(state: Sm2State, stage: u32) -> Sm2State {
    if state.repetitions != 0 || stage == 0 {
        return state;
    }

    let index = ((stage - 1) as usize).min(INTERVALS.len() - 1);
    Sm2State {
        repetitions: stage,
        interval: INTERVALS[index],
        ..state
    }
}

/// Whether an SM-2 interval puts a word out of ordinary review
pub fn is_mastered_interval(interval: u32) -> bool {
    interval > MASTERED_INTERVAL_DAYS
}

/// Next SM-2 fields for a rating, without any time component
pub fn next_sm2_state(state: Sm2State, stage: u32, quality: Quality) -> Sm2State {
    let Sm2State {
        mut easiness,
        mut interval,
        mut repetitions,
    } = migrate_legacy(state, stage);

    let q = quality.value() as f64;

    if quality.is_success() {
        // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
        easiness += 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    }
    easiness = easiness.max(MIN_EASINESS);

    if quality.is_success() {
        interval = match repetitions {
            0 => 1,
            1 => 6,
            _ => (interval as f64 * easiness).floor().min(u32::MAX as f64) as u32,
        };
        repetitions += 1;
    } else {
        // Forgetting always restarts at one day
        repetitions = 0;
        interval = 1;
    }

    Sm2State {
        easiness,
        interval,
        repetitions,
    }
}

/// Grade a word under SM-2
///
/// # Arguments
/// * `state` - Current SM-2 fields (`Sm2State::default()` for a new word)
/// * `stage` - Legacy stage on the same record, used by the migration bridge
/// * `quality` - Rating 0-5
/// * `now` - Current time
pub fn calculate_sm2(
    state: Sm2State,
    stage: u32,
    quality: Quality,
    now: DateTime<Utc>,
) -> Sm2Result {
    let next = next_sm2_state(state, stage, quality);

    Sm2Result {
        easiness: next.easiness,
        interval: next.interval,
        repetitions: next.repetitions,
        next_review_time: days_from(now, next.interval),
        mastered: is_mastered_interval(next.interval),
    }
}

/// Grade a word under the staged-interval scheme
///
/// A correct answer past the end of the table masters the word and stops
/// automatic scheduling. A wrong answer resets to stage 0 with no due time,
/// which puts the word back with the new words.
pub fn calculate_staged(ok: bool, stage: u32, now: DateTime<Utc>) -> StagedResult {
    if !ok {
        return StagedResult {
            stage: 0,
            next_review_time: 0.0,
            mastered: false,
        };
    }

    match INTERVALS.get(stage as usize) {
        Some(&days) => StagedResult {
            stage: stage + 1,
            next_review_time: days_from(now, days),
            mastered: false,
        },
        None => StagedResult {
            stage: stage + 1,
            next_review_time: 0.0,
            mastered: true,
        },
    }
}

/// Classify which scheme the next SM-2 grading will see
pub fn classify(state: Sm2State, stage: u32) -> Scheme {
    if state.repetitions == 0 && stage > 0 {
        Scheme::Staged { stage }
    } else if state.repetitions == 0 && state.interval == 0 {
        Scheme::New
    } else {
        Scheme::Sm2 { state }
    }
}

/// Intervals each review button would produce: forgot, vague, familiar
pub fn preview_intervals(state: Sm2State, stage: u32) -> [u32; 3] {
    [Quality::FORGOT, Quality::VAGUE, Quality::FAMILIAR]
        .map(|quality| next_sm2_state(state, stage, quality).interval)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    fn state(easiness: f64, interval: u32, repetitions: u32) -> Sm2State {
        Sm2State {
            easiness,
            interval,
            repetitions,
        }
    }

    #[test]
    fn test_first_three_successes() {
        let first = calculate_sm2(Sm2State::default(), 0, q(5), now());
        assert_eq!(first.interval, 1);
        assert_eq!(first.repetitions, 1);

        let second = calculate_sm2(first.state(), 0, q(5), now());
        assert_eq!(second.interval, 6);
        assert_eq!(second.repetitions, 2);

        let third = calculate_sm2(second.state(), 0, q(5), now());
        assert_eq!(third.repetitions, 3);
        assert_eq!(third.interval, (6.0 * third.easiness).floor() as u32);
        assert_eq!(third.interval, 16);
    }

    #[test]
    fn test_next_review_time_is_interval_days_ahead() {
        let result = calculate_sm2(state(2.5, 6, 2), 0, q(4), now());
        let expected = unix_seconds(now() + Duration::days(result.interval as i64));
        assert_eq!(result.next_review_time, expected);
    }

    #[test]
    fn test_quality_three_is_success() {
        let result = calculate_sm2(state(2.5, 6, 2), 0, q(3), now());
        assert_eq!(result.repetitions, 3);
        // 2.5 - 0.14
        assert!((result.easiness - 2.36).abs() < 1e-9);
        assert_eq!(result.interval, (6.0 * result.easiness).floor() as u32);
    }

    #[test]
    fn test_quality_two_is_failure() {
        let result = calculate_sm2(state(2.5, 15, 4), 0, q(2), now());
        assert_eq!(result.repetitions, 0);
        assert_eq!(result.interval, 1);
        assert_eq!(result.easiness, 2.5);
    }

    #[test]
    fn test_failure_after_long_streak_fully_resets() {
        let result = calculate_sm2(state(2.9, 150, 12), 0, q(1), now());
        assert_eq!(result.repetitions, 0);
        assert_eq!(result.interval, 1);
        assert!(!result.mastered);
    }

    #[test]
    fn test_easiness_floor() {
        let mut current = state(1.35, 10, 3);
        for _ in 0..10 {
            current = calculate_sm2(current, 0, q(3), now()).state();
            assert!(current.easiness >= MIN_EASINESS);
        }
        assert_eq!(current.easiness, MIN_EASINESS);

        let mut current = state(2.5, 10, 3);
        for _ in 0..10 {
            current = calculate_sm2(current, 0, q(0), now()).state();
            assert!(current.easiness >= MIN_EASINESS);
        }
    }

    #[test]
    fn test_easiness_below_floor_is_clamped_on_failure() {
        let result = calculate_sm2(state(1.1, 3, 2), 0, q(0), now());
        assert_eq!(result.easiness, MIN_EASINESS);
    }

    #[test]
    fn test_interval_compounds() {
        let mut current = state(2.5, 6, 2);
        let mut previous = current.interval;
        for _ in 0..4 {
            current = calculate_sm2(current, 0, q(5), now()).state();
            assert!(current.interval > previous);
            previous = current.interval;
        }
    }

    #[test]
    fn test_mastered_threshold() {
        assert!(!is_mastered_interval(180));
        assert!(is_mastered_interval(181));

        // Easiness pinned at the floor: 139 * 1.3 = 180.7 -> 180
        let below = calculate_sm2(state(1.3, 139, 5), 0, q(3), now());
        assert_eq!(below.interval, 180);
        assert!(!below.mastered);

        let above = calculate_sm2(state(1.3, 140, 5), 0, q(3), now());
        assert!(above.interval > 180);
        assert!(above.mastered);
    }

    #[test]
    fn test_long_familiar_streak_stays_finite() {
        let mut current = Sm2State::default();
        let mut previous_time = 0.0;
        for _ in 0..40 {
            let result = calculate_sm2(current, 0, Quality::FAMILIAR, now());
            assert!(result.next_review_time.is_finite());
            assert!(result.next_review_time >= previous_time);
            assert!(result.interval >= current.interval);
            previous_time = result.next_review_time;
            current = result.state();
        }

        // The product saturates instead of wrapping
        assert_eq!(current.interval, u32::MAX);
        assert!(is_mastered_interval(current.interval));
    }

    #[test]
    fn test_legacy_migration() {
        let migrated = migrate_legacy(Sm2State::default(), 3);
        assert_eq!(migrated.repetitions, 3);
        assert_eq!(migrated.interval, 4);

        // Stages past the table clamp to the last entry
        assert_eq!(migrate_legacy(Sm2State::default(), 9).interval, 30);
        // Nothing to migrate without a stage
        assert_eq!(migrate_legacy(Sm2State::default(), 0), Sm2State::default());
    }

    #[test]
    fn test_legacy_migration_feeds_first_sm2_grading() {
        let first = calculate_sm2(state(2.5, 0, 0), 3, q(5), now());
        // Seeded to repetitions 3, interval 4, then 4 * 2.6
        assert_eq!(first.repetitions, 4);
        assert_eq!(first.interval, 10);

        // Repetitions are non-zero now so the stage is ignored
        let second = calculate_sm2(first.state(), 3, q(5), now());
        assert_eq!(second.repetitions, 5);
        assert_eq!(second.interval, (10.0 * second.easiness).floor() as u32);
    }

    #[test]
    fn test_migration_with_nonzero_interval() {
        // A record that already failed under SM-2 keeps interval 1 but has no
        // repetitions; the bridge still re-seeds from the stage.
        let seeded = migrate_legacy(state(2.5, 1, 0), 2);
        assert_eq!(seeded.repetitions, 2);
        assert_eq!(seeded.interval, 2);
    }

    #[test]
    fn test_staged_success() {
        let result = calculate_staged(true, 0, now());
        assert_eq!(result.stage, 1);
        assert!(!result.mastered);
        assert_eq!(result.next_review_time, unix_seconds(now() + Duration::days(1)));

        let result = calculate_staged(true, 5, now());
        assert_eq!(result.stage, 6);
        assert_eq!(result.next_review_time, unix_seconds(now() + Duration::days(30)));
    }

    #[test]
    fn test_staged_table_exhausted() {
        let result = calculate_staged(true, 6, now());
        assert_eq!(result.stage, 7);
        assert_eq!(result.next_review_time, 0.0);
        assert!(result.mastered);
    }

    #[test]
    fn test_staged_failure_resets() {
        let result = calculate_staged(false, 4, now());
        assert_eq!(result.stage, 0);
        assert_eq!(result.next_review_time, 0.0);
        assert!(!result.mastered);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(Sm2State::default(), 0), Scheme::New);
        assert_eq!(classify(Sm2State::default(), 2), Scheme::Staged { stage: 2 });
        let sm2 = state(2.6, 6, 2);
        assert_eq!(classify(sm2, 2), Scheme::Sm2 { state: sm2 });
        let relearning = state(2.6, 1, 0);
        assert_eq!(classify(relearning, 0), Scheme::Sm2 { state: relearning });
    }

    #[test]
    fn test_preview_intervals() {
        assert_eq!(preview_intervals(Sm2State::default(), 0), [1, 1, 1]);
        assert_eq!(preview_intervals(state(2.5, 1, 1), 0), [1, 6, 6]);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
