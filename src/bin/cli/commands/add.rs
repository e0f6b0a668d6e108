use anyhow::Result;

use vocab_lib::words::WordContent;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub struct AddFields {
    pub meaning: Option<String>,
    pub phonetic: Option<String>,
    pub example: Option<String>,
    pub roots: Option<String>,
    pub synonyms: Option<String>,
    pub tags: Option<String>,
}

impl AddFields {
    fn into_content(self) -> WordContent {
        let tags = self.tags.map(|t| {
            t.split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(",")
        });

        WordContent {
            phonetic: self.phonetic.unwrap_or_default(),
            meaning: self.meaning.unwrap_or_default(),
            example: self.example.unwrap_or_default(),
            roots: self.roots.unwrap_or_default(),
            synonyms: self.synonyms.unwrap_or_default(),
            tags: tags.unwrap_or_default(),
            ..Default::default()
        }
    }
}

pub fn run(
    app: &App,
    word: &str,
    fields: AddFields,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let word = word.trim();
    if word.is_empty() {
        anyhow::bail!("Word must not be empty");
    }

    let record = app.add_word(word, &fields.into_content())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        OutputFormat::Plain => {
            println!("Added {}", paint(&record.word, Color::BOLD, use_color));
            if !record.content.meaning.is_empty() {
                println!("  Meaning: {}", record.content.meaning);
            }
            if !record.content.tags.is_empty() {
                println!("  Tags: {}", record.content.tags);
            }
        }
    }

    Ok(())
}
