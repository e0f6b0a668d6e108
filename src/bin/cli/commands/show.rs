use anyhow::Result;

use vocab_lib::scheduling::{format_interval, preview_intervals, Scheme};

use crate::app::App;
use crate::commands::describe_due;
use crate::render::terminal::{paint, render_details, Color};
use crate::OutputFormat;

const BUTTON_LABELS: [&str; 3] = ["forgot", "vague", "familiar"];

pub fn run(app: &App, word: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let record = app.find_word(word)?;
    let now = app.now_seconds();
    let preview = preview_intervals(record.sm2_state(), record.stage);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "record": record,
                "scheme": record.scheme(),
                "isDue": record.is_due(now),
                "preview": {
                    "forgot": preview[0],
                    "vague": preview[1],
                    "familiar": preview[2],
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let heading = if record.content.phonetic.is_empty() {
                record.word.clone()
            } else {
                format!("{}  {}", record.word, record.content.phonetic)
            };
            println!("{}", paint(&heading, Color::BOLD, use_color));
            for line in render_details(&record, use_color) {
                println!("{}", line);
            }

            println!();
            let scheme = match record.scheme() {
                Scheme::New => "new".to_string(),
                Scheme::Staged { stage } => format!("staged, stage {}", stage),
                Scheme::Sm2 { state } => format!(
                    "SM-2, EF {:.2}, interval {}, {} in a row",
                    state.easiness,
                    format_interval(state.interval),
                    state.repetitions
                ),
            };
            println!("  Schedule: {}", scheme);
            println!("  Next:     {}", describe_due(&record, now));
            println!("  Reviews:  {}", record.review_count);
            println!("  Added:    {}", record.date_added);

            let buttons: Vec<String> = BUTTON_LABELS
                .iter()
                .zip(preview)
                .map(|(label, days)| format!("{} {}", label, format_interval(days)))
                .collect();
            println!("  Ratings:  {}", buttons.join(" | "));
        }
    }

    Ok(())
}
