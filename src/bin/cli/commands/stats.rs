use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, render_heatmap, Color};
use crate::OutputFormat;

pub fn run(app: &App, with_heatmap: bool, format: &OutputFormat, use_color: bool) -> Result<()> {
    let stats = app.stats()?;
    let heatmap = if with_heatmap { Some(app.heatmap()?) } else { None };

    match format {
        OutputFormat::Json => {
            let mut output = serde_json::to_value(&stats)?;
            if let Some((since, counts)) = &heatmap {
                let days: serde_json::Map<String, serde_json::Value> = counts
                    .iter()
                    .map(|(day, count)| (day.to_string(), serde_json::json!(count)))
                    .collect();
                output["heatmap"] = serde_json::json!({
                    "since": since.to_string(),
                    "days": days,
                });
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Words:     {}", stats.total);
            println!("Mastered:  {}", paint(&stats.mastered.to_string(), Color::GREEN, use_color));
            println!("Learning:  {}", stats.learning);
            println!("Due now:   {}", paint(&stats.due_now.to_string(), Color::YELLOW, use_color));
            println!("Later:     {}", stats.scheduled_later);

            if let Some((since, counts)) = &heatmap {
                let reviews: usize = counts.values().sum();
                println!();
                println!("{} reviews since {}", reviews, since);
                for row in render_heatmap(counts, *since, app.today()) {
                    println!("{}", row);
                }
            }
        }
    }

    Ok(())
}

pub fn run_history(app: &App, word: &str, format: &OutputFormat) -> Result<()> {
    let record = app.find_word(word)?;
    let history = app.history(&record.word)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        OutputFormat::Plain => {
            if history.is_empty() {
                println!("'{}' has not been reviewed yet.", record.word);
                return Ok(());
            }
            println!("{:<12} {}", "Date", "Rating");
            for entry in &history {
                println!("{:<12} {}", entry.date.to_string(), entry.rating);
            }
        }
    }

    Ok(())
}
