//! SQLite-backed word store
//!
//! Schema:
//! ```text
//! words           one row per word, content + scheduling fields
//! review_history  one row per grading (word_id, review_date, rating)
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{ReviewHistoryEntry, Sm2Update, StagedUpdate, WordContent, WordRecord};
use super::store::{Result, StoreError, WordStore};
use crate::scheduling::non_negative;

const DATE_FORMAT: &str = "%Y-%m-%d";

const WORD_COLUMNS: &str = "id, word, phonetic, meaning, example, context_en, context_cn, roots, \
    synonyms, tags, date_added, stage, easiness, interval, repetitions, next_review_time, \
    review_count, mastered";

/// Raw row as SQLite hands it back, before validation
struct WordRow {
    id: i64,
    word: String,
    content: WordContent,
    date_added: Option<String>,
    stage: i64,
    easiness: f64,
    interval: i64,
    repetitions: i64,
    next_review_time: f64,
    review_count: i64,
    mastered: bool,
}

impl WordRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let text = |idx: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
        };

        Ok(Self {
            id: row.get(0)?,
            word: row.get(1)?,
            content: WordContent {
                phonetic: text(2)?,
                meaning: text(3)?,
                example: text(4)?,
                context_en: text(5)?,
                context_cn: text(6)?,
                roots: text(7)?,
                synonyms: text(8)?,
                tags: text(9)?,
            },
            date_added: row.get(10)?,
            stage: row.get(11)?,
            easiness: row.get(12)?,
            interval: row.get(13)?,
            repetitions: row.get(14)?,
            next_review_time: row.get(15)?,
            review_count: row.get(16)?,
            mastered: row.get::<_, i64>(17)? != 0,
        })
    }

    fn into_record(self) -> Result<WordRecord> {
        let date_added = match self.date_added.as_deref() {
            Some(raw) if !raw.is_empty() => parse_date(raw)?,
            _ => NaiveDate::default(),
        };

        Ok(WordRecord {
            id: self.id,
            word: self.word,
            content: self.content,
            date_added,
            stage: non_negative("stage", self.stage)?,
            easiness: self.easiness,
            interval: non_negative("interval", self.interval)?,
            repetitions: non_negative("repetitions", self.repetitions)?,
            next_review_time: self.next_review_time,
            review_count: non_negative("review_count", self.review_count)?,
            mastered: self.mastered,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("bad date '{}': {}", raw, e)))
}

/// Word store persisted in a single SQLite file
pub struct SqliteWordStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteWordStore {
    /// Open (or create) the database at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        Self::init(&conn)?;
        log::debug!("Opened word store at {:?}", db_path);

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        })
    }

    /// Open a throwaway database that lives as long as the store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS words (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT UNIQUE NOT NULL,
                phonetic TEXT,
                meaning TEXT,
                example TEXT,
                roots TEXT,
                synonyms TEXT,
                context_en TEXT,
                context_cn TEXT,
                date_added TEXT,
                next_review_time REAL DEFAULT 0,
                review_count INTEGER DEFAULT 0,
                mastered INTEGER DEFAULT 0,
                stage INTEGER DEFAULT 0,
                easiness REAL DEFAULT 2.5,
                interval INTEGER DEFAULT 0,
                repetitions INTEGER DEFAULT 0,
                tags TEXT
            );

            CREATE TABLE IF NOT EXISTS review_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word_id INTEGER,
                review_date TEXT,
                rating INTEGER,
                FOREIGN KEY(word_id) REFERENCES words(id)
            );

            CREATE INDEX IF NOT EXISTS idx_word ON words(word);
            CREATE INDEX IF NOT EXISTS idx_next_review_time ON words(next_review_time);
            CREATE INDEX IF NOT EXISTS idx_mastered ON words(mastered);
            CREATE INDEX IF NOT EXISTS idx_history_date ON review_history(review_date);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }

    // ==================== Word Lifecycle ====================

    /// Add a new word with default scheduling fields
    pub fn add_word(
        &self,
        word: &str,
        content: &WordContent,
        date_added: NaiveDate,
    ) -> Result<WordRecord> {
        {
            let conn = self.lock()?;
            let inserted = conn.execute(
                r#"
                INSERT OR IGNORE INTO words (word, phonetic, meaning, example, context_en,
                    context_cn, roots, synonyms, tags, date_added, next_review_time)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0)
                "#,
                params![
                    word,
                    content.phonetic,
                    content.meaning,
                    content.example,
                    content.context_en,
                    content.context_cn,
                    content.roots,
                    content.synonyms,
                    content.tags,
                    date_added.format(DATE_FORMAT).to_string(),
                ],
            )?;
            if inserted == 0 {
                return Err(StoreError::Duplicate(word.to_string()));
            }
        }

        self.get(word)?
            .ok_or_else(|| StoreError::NotFound(word.to_string()))
    }

    /// Delete a word and its history; returns whether it existed
    pub fn delete_word(&self, word: &str) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM review_history WHERE word_id IN (SELECT id FROM words WHERE word = ?1)",
            params![word],
        )?;
        let deleted = tx.execute("DELETE FROM words WHERE word = ?1", params![word])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Take a word out of ordinary review
    pub fn mark_mastered(&self, word: &str) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute("UPDATE words SET mastered = 1 WHERE word = ?1", params![word])?;
        if updated == 0 {
            return Err(StoreError::NotFound(word.to_string()));
        }
        Ok(())
    }

    /// Replace the source sentence pair; scheduling fields are untouched
    pub fn update_context(&self, word: &str, context_en: &str, context_cn: &str) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE words SET context_en = ?1, context_cn = ?2 WHERE word = ?3",
            params![context_en, context_cn, word],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(word.to_string()));
        }
        Ok(())
    }

    fn insert_history(
        tx: &rusqlite::Transaction,
        word: &str,
        date: NaiveDate,
        rating: i64,
    ) -> Result<()> {
        tx.execute(
            r#"
            INSERT INTO review_history (word_id, review_date, rating)
            SELECT id, ?2, ?3 FROM words WHERE word = ?1
            "#,
            params![word, date.format(DATE_FORMAT).to_string(), rating],
        )?;
        Ok(())
    }
}

impl WordStore for SqliteWordStore {
    fn get(&self, word: &str) -> Result<Option<WordRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM words WHERE word = ?1", WORD_COLUMNS);
        let row = conn
            .query_row(&sql, params![word], WordRow::from_row)
            .optional()?;
        row.map(WordRow::into_record).transpose()
    }

    fn get_all(&self) -> Result<Vec<WordRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM words ORDER BY next_review_time ASC", WORD_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], WordRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(WordRow::into_record).collect()
    }

    fn apply_staged_update(&self, word: &str, update: &StagedUpdate) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(
            r#"
            UPDATE words
            SET stage = ?1, next_review_time = ?2, mastered = ?3, review_count = review_count + 1
            WHERE word = ?4
            "#,
            params![update.stage, update.next_review_time, update.mastered as i64, word],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(word.to_string()));
        }
        Self::insert_history(&tx, word, update.reviewed_on, update.history_rating())?;
        tx.commit()?;
        Ok(())
    }

    fn apply_sm2_update(&self, word: &str, update: &Sm2Update) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let updated = tx.execute(
            r#"
            UPDATE words
            SET easiness = ?1, interval = ?2, repetitions = ?3, next_review_time = ?4,
                mastered = ?5, review_count = review_count + 1
            WHERE word = ?6
            "#,
            params![
                update.easiness,
                update.interval,
                update.repetitions,
                update.next_review_time,
                update.mastered as i64,
                word,
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(word.to_string()));
        }
        Self::insert_history(&tx, word, update.reviewed_on, update.rating.value() as i64)?;
        tx.commit()?;
        Ok(())
    }

    fn history(&self, word: &str) -> Result<Vec<ReviewHistoryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT h.word_id, h.review_date, h.rating
            FROM review_history h
            JOIN words w ON w.id = h.word_id
            WHERE w.word = ?1
            ORDER BY h.review_date, h.id
            "#,
        )?;
        let rows = stmt
            .query_map(params![word], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(word_id, date, rating)| -> Result<ReviewHistoryEntry> {
                Ok(ReviewHistoryEntry {
                    word_id,
                    date: parse_date(&date)?,
                    rating,
                })
            })
            .collect()
    }

    fn heatmap(&self, since: NaiveDate) -> Result<BTreeMap<NaiveDate, usize>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT review_date, COUNT(*)
            FROM review_history
            WHERE review_date >= ?1
            GROUP BY review_date
            "#,
        )?;
        let rows = stmt
            .query_map(params![since.format(DATE_FORMAT).to_string()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut counts = BTreeMap::new();
        for (date, count) in rows {
            counts.insert(parse_date(&date)?, count as usize);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::Quality;
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteWordStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteWordStore::open(temp_dir.path().join("vocab.db")).unwrap();
        (store, temp_dir)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn content(meaning: &str) -> WordContent {
        WordContent {
            meaning: meaning.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_and_get_word() {
        let (store, _temp) = create_test_store();
        let added = store.add_word("laconic", &content("terse"), date(1)).unwrap();

        assert_eq!(added.word, "laconic");
        assert_eq!(added.content.meaning, "terse");
        assert_eq!(added.date_added, date(1));
        assert_eq!(added.easiness, 2.5);
        assert_eq!(added.next_review_time, 0.0);
        assert!(!added.mastered);
    }

    #[test]
    fn test_duplicate_word() {
        let (store, _temp) = create_test_store();
        store.add_word("laconic", &content("terse"), date(1)).unwrap();
        let err = store.add_word("laconic", &content("short"), date(2)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn test_sm2_update_persists_and_logs() {
        let (store, _temp) = create_test_store();
        store.add_word("laconic", &content("terse"), date(1)).unwrap();

        let update = Sm2Update {
            easiness: 2.6,
            interval: 6,
            repetitions: 2,
            next_review_time: 1_700_000_000.5,
            mastered: false,
            rating: Quality::FAMILIAR,
            reviewed_on: date(3),
        };
        store.apply_sm2_update("laconic", &update).unwrap();

        let record = store.get("laconic").unwrap().unwrap();
        assert_eq!(record.interval, 6);
        assert_eq!(record.repetitions, 2);
        assert_eq!(record.review_count, 1);
        assert_eq!(record.next_review_time, 1_700_000_000.5);
        // Content untouched
        assert_eq!(record.content.meaning, "terse");

        let history = store.history("laconic").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].rating, 5);
        assert_eq!(history[0].date, date(3));
    }

    #[test]
    fn test_staged_update_missing_word() {
        let (store, _temp) = create_test_store();
        let update = StagedUpdate {
            stage: 1,
            next_review_time: 10.0,
            mastered: false,
            reviewed_on: date(1),
        };
        let err = store.apply_staged_update("ghost", &update).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_negative_stage_rejected() {
        let (store, _temp) = create_test_store();
        store.add_word("laconic", &content("terse"), date(1)).unwrap();
        store
            .lock()
            .unwrap()
            .execute("UPDATE words SET stage = -2 WHERE word = 'laconic'", [])
            .unwrap();

        let err = store.get("laconic").unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_heatmap_and_delete() {
        let (store, _temp) = create_test_store();
        store.add_word("a", &content(""), date(1)).unwrap();
        store.add_word("b", &content(""), date(1)).unwrap();
        let staged = |day| StagedUpdate {
            stage: 1,
            next_review_time: 10.0,
            mastered: false,
            reviewed_on: date(day),
        };
        store.apply_staged_update("a", &staged(2)).unwrap();
        store.apply_staged_update("b", &staged(2)).unwrap();
        store.apply_staged_update("b", &staged(5)).unwrap();

        let heatmap = store.heatmap(date(1)).unwrap();
        assert_eq!(heatmap[&date(2)], 2);
        assert_eq!(heatmap[&date(5)], 1);

        assert!(store.delete_word("b").unwrap());
        assert!(!store.delete_word("b").unwrap());
        assert_eq!(store.heatmap(date(1)).unwrap()[&date(2)], 1);
    }

    #[test]
    fn test_mark_mastered_and_context() {
        let (store, _temp) = create_test_store();
        store.add_word("a", &content("x"), date(1)).unwrap();
        store.mark_mastered("a").unwrap();
        store.update_context("a", "An a here.", "这里").unwrap();

        let record = store.get("a").unwrap().unwrap();
        assert!(record.mastered);
        assert_eq!(record.content.context_en, "An a here.");
        assert_eq!(record.stage, 0);
        assert!(matches!(store.mark_mastered("zzz"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("vocab.db");
        {
            let store = SqliteWordStore::open(&path).unwrap();
            store.add_word("durable", &content("lasting"), date(1)).unwrap();
        }
        let store = SqliteWordStore::open(&path).unwrap();
        assert_eq!(store.get_all().unwrap().len(), 1);
        assert_eq!(store.db_path(), Some(path.as_path()));
    }
}
