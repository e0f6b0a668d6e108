use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_master(app: &App, word: &str, format: &OutputFormat) -> Result<()> {
    app.mark_mastered(word)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "word": word, "mastered": true }));
        }
        OutputFormat::Plain => println!("Marked '{}' as mastered", word),
    }
    Ok(())
}

pub fn run_context(
    app: &App,
    word: &str,
    english: &str,
    translation: &str,
    format: &OutputFormat,
) -> Result<()> {
    app.update_context(word, english.trim(), translation.trim())?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "word": word,
                "contextEn": english.trim(),
                "contextCn": translation.trim(),
            });
            println!("{}", output);
        }
        OutputFormat::Plain => println!("Updated context of '{}'", word),
    }
    Ok(())
}

pub fn run_delete(app: &App, word: &str, format: &OutputFormat) -> Result<()> {
    let deleted = app.delete_word(word)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "word": word, "deleted": deleted }));
        }
        OutputFormat::Plain => {
            if deleted {
                println!("Deleted '{}'", word);
            } else {
                println!("No word '{}' in the vocabulary", word);
            }
        }
    }
    Ok(())
}

pub fn run_config(app: &App, init: bool, format: &OutputFormat) -> Result<()> {
    if init {
        app.config
            .save(&app.config_path)
            .with_context(|| format!("Failed to write {}", app.config_path.display()))?;
    }
    let database = app.config.database_path().context("Failed to get data directory")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "configPath": app.config_path.to_string_lossy(),
                "databasePath": database.to_string_lossy(),
                "config": app.config,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if init {
                println!("Wrote {}", app.config_path.display());
            }
            println!("Config:    {}", app.config_path.display());
            println!("Database:  {}", database.display());
            println!("Method:    {:?}", app.config.review_method);
            println!("Cram:      {}", app.config.cram_mode);
            println!("Reminders: every {} minutes", app.config.reminder_interval_minutes);
            if let Some(seed) = app.config.seed {
                println!("Seed:      {}", seed);
            }
        }
    }
    Ok(())
}
