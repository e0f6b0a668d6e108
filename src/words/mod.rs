//! Vocabulary words and their persistence
//!
//! This module provides:
//! - The word record and its review history entries
//! - The `WordStore` contract used by review sessions
//! - In-memory and SQLite stores
//! - Vocabulary statistics

mod memory;
pub mod models;
mod sqlite;
pub mod stats;
mod store;

pub use memory::InMemoryWordStore;
pub use models::*;
pub use sqlite::SqliteWordStore;
pub use stats::{due_count, heatmap_start, scheduled_later_count, ReviewStats};
pub use store::{Result, StoreError, WordStore};
