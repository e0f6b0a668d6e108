use anyhow::Result;

use vocab_lib::review::select_due;

use crate::app::App;
use crate::commands::describe_due;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, due_only: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    let now = app.now_seconds();
    let mut records = app.list_words()?;
    if due_only {
        records = select_due(records, now, false);
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = records
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "word": r.word,
                        "meaning": r.content.meaning,
                        "scheme": r.scheme(),
                        "nextReviewTime": r.next_review_time,
                        "isDue": r.is_due(now),
                        "mastered": r.mastered,
                        "reviewCount": r.review_count,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if records.is_empty() {
                println!("No words{}.", if due_only { " due" } else { "" });
                return Ok(());
            }

            let word_width = records
                .iter()
                .map(|r| r.word.chars().count())
                .max()
                .unwrap_or(4)
                .clamp(4, 24);
            let due_width = 16;

            println!(
                "{:<ww$} {:<dw$} {:>7} {}",
                "Word",
                "Next",
                "Reviews",
                "Meaning",
                ww = word_width,
                dw = due_width
            );
            println!("{}", "-".repeat(word_width + due_width + 30));

            for record in &records {
                let due = describe_due(record, now);
                let due_cell = format!("{:<dw$}", due, dw = due_width);
                let due_cell = if record.is_due(now) {
                    paint(&due_cell, Color::YELLOW, use_color)
                } else {
                    paint(&due_cell, Color::GRAY, use_color)
                };
                let first_line = record.content.meaning.lines().next().unwrap_or("");
                let meaning: String = first_line.chars().take(40).collect();

                println!(
                    "{:<ww$} {} {:>7} {}",
                    record.word,
                    due_cell,
                    record.review_count,
                    meaning,
                    ww = word_width
                );
            }

            println!();
            println!("{} words", records.len());
        }
    }

    Ok(())
}
