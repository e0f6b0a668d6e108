mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "vocab-cli", about = "Spaced-repetition vocabulary review", version)]
struct Cli {
    /// Use a specific config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a word to the vocabulary
    Add {
        word: String,
        #[arg(long)]
        meaning: Option<String>,
        #[arg(long)]
        phonetic: Option<String>,
        /// Example sentence (use "-" to read from stdin)
        #[arg(long)]
        example: Option<String>,
        #[arg(long)]
        roots: Option<String>,
        #[arg(long)]
        synonyms: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },

    /// List words with their schedule
    List {
        /// Show only words due for review
        #[arg(long)]
        due: bool,
    },

    /// Show a word, its schedule and what each rating would do
    Show { word: String },

    /// Review due words
    Review {
        /// Include every word regardless of due time or mastery
        #[arg(long)]
        cram: bool,
        /// Type the word from its meaning instead of flipping cards
        #[arg(long)]
        spelling: bool,
        /// Seed for a reproducible card order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Vocabulary statistics
    Stats {
        /// Include the daily review heatmap
        #[arg(long)]
        heatmap: bool,
    },

    /// Review history of a word
    History { word: String },

    /// Take a word out of ordinary review
    Master { word: String },

    /// Set the sentence a word was met in
    Context {
        word: String,
        /// Source sentence
        english: String,
        /// Its translation
        #[arg(default_value = "")]
        translation: String,
    },

    /// Delete a word and its history
    Delete { word: String },

    /// Show the active configuration
    Config {
        /// Write the current settings to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Resolve "-" as stdin
fn resolve_content(content: Option<String>) -> Option<String> {
    match content.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
            Some(buf.trim_end().to_string())
        }
        _ => content,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.config.as_deref())?;

    match cli.command {
        Command::Add { word, meaning, phonetic, example, roots, synonyms, tags } => {
            let fields = commands::add::AddFields {
                meaning,
                phonetic,
                example: resolve_content(example),
                roots,
                synonyms,
                tags,
            };
            commands::add::run(&app, &word, fields, &cli.format, use_color)?;
        }
        Command::List { due } => {
            commands::list::run(&app, due, &cli.format, use_color)?;
        }
        Command::Show { word } => {
            commands::show::run(&app, &word, &cli.format, use_color)?;
        }
        Command::Review { cram, spelling, seed } => {
            commands::review::run(&app, cram, spelling, seed, &cli.format, use_color)?;
        }
        Command::Stats { heatmap } => {
            commands::stats::run(&app, heatmap, &cli.format, use_color)?;
        }
        Command::History { word } => {
            commands::stats::run_history(&app, &word, &cli.format)?;
        }
        Command::Master { word } => {
            commands::manage::run_master(&app, &word, &cli.format)?;
        }
        Command::Context { word, english, translation } => {
            commands::manage::run_context(&app, &word, &english, &translation, &cli.format)?;
        }
        Command::Delete { word } => {
            commands::manage::run_delete(&app, &word, &cli.format)?;
        }
        Command::Config { init } => {
            commands::manage::run_config(&app, init, &cli.format)?;
        }
    }

    Ok(())
}
