use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vocab_lib::config::AppConfig;
use vocab_lib::review::{Clock, ReviewSession, SessionOptions, SystemClock};
use vocab_lib::words::{
    heatmap_start, ReviewHistoryEntry, ReviewStats, SqliteWordStore, WordContent, WordRecord,
    WordStore,
};

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub store: Arc<SqliteWordStore>,
    pub clock: Arc<SystemClock>,
}

impl App {
    /// Load config (default location unless overridden) and open the database
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => AppConfig::default_path().context("Failed to locate config directory")?,
        };
        let config = AppConfig::load_or_default(&config_path);

        let db_path = config
            .database_path()
            .context("Failed to get data directory")?;
        log::debug!("Opening word database at {:?}", db_path);
        let store = SqliteWordStore::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        Ok(Self {
            config,
            config_path,
            store: Arc::new(store),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now_seconds(&self) -> f64 {
        self.clock.now_seconds()
    }

    pub fn add_word(&self, word: &str, content: &WordContent) -> Result<WordRecord> {
        self.store
            .add_word(word, content, self.today())
            .with_context(|| format!("Failed to add '{}'", word))
    }

    pub fn find_word(&self, word: &str) -> Result<WordRecord> {
        self.store
            .get(word)
            .context("Failed to read word")?
            .with_context(|| format!("No word '{}' in the vocabulary", word))
    }

    pub fn list_words(&self) -> Result<Vec<WordRecord>> {
        self.store.get_all().context("Failed to list words")
    }

    pub fn history(&self, word: &str) -> Result<Vec<ReviewHistoryEntry>> {
        self.store.history(word).context("Failed to read review history")
    }

    pub fn stats(&self) -> Result<ReviewStats> {
        let records = self.list_words()?;
        Ok(ReviewStats::from_records(&records, self.now_seconds()))
    }

    /// Daily review counts from the heatmap window start through today
    pub fn heatmap(&self) -> Result<(NaiveDate, std::collections::BTreeMap<NaiveDate, usize>)> {
        let since = heatmap_start(self.today());
        let counts = self.store.heatmap(since).context("Failed to read review history")?;
        Ok((since, counts))
    }

    pub fn mark_mastered(&self, word: &str) -> Result<()> {
        self.store
            .mark_mastered(word)
            .with_context(|| format!("Failed to mark '{}' as mastered", word))
    }

    pub fn update_context(&self, word: &str, context_en: &str, context_cn: &str) -> Result<()> {
        self.store
            .update_context(word, context_en, context_cn)
            .with_context(|| format!("Failed to update context of '{}'", word))
    }

    pub fn delete_word(&self, word: &str) -> Result<bool> {
        self.store
            .delete_word(word)
            .with_context(|| format!("Failed to delete '{}'", word))
    }

    /// Start a session; a seed from the command line wins over the config one
    pub fn start_session(
        &self,
        options: SessionOptions,
        seed: Option<u64>,
    ) -> Result<ReviewSession> {
        let rng = match seed.or(self.config.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let store: Arc<dyn WordStore> = self.store.clone();
        let clock: Arc<dyn Clock> = self.clock.clone();
        ReviewSession::start(store, clock, options, rng).context("Failed to start review session")
    }
}
