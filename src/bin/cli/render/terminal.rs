use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use vocab_lib::words::WordRecord;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in `color` when coloring is on
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

const CLOZE_BLANK: &str = " ____ ";

/// Blank out `word` and its suffixed forms in the first line of `example`
///
/// "Ran" in "She ran, he runs" is left alone for "run", but "runs" and
/// "running" are masked.
pub fn cloze(example: &str, word: &str) -> String {
    let first_line = example.lines().next().unwrap_or("").trim();
    if word.is_empty() {
        return first_line.to_string();
    }

    let pattern = format!(r"(?i)\b{}\w*\b", regex::escape(word));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(first_line, CLOZE_BLANK).into_owned(),
        Err(e) => {
            log::warn!("Could not build cloze pattern for '{}': {}", word, e);
            first_line.to_string()
        }
    }
}

/// Word-wrap `text` to `max_width` columns, prefixing each line
pub fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.len());

    for line in text.lines() {
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(format!("{}{}", prefix, current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            lines.push(format!("{}{}", prefix, current_line));
        }
    }

    lines
}

/// The back of a card: everything but the word itself
pub fn render_details(record: &WordRecord, use_color: bool) -> Vec<String> {
    let content = &record.content;
    let mut lines = Vec::new();

    let fields = [
        ("Meaning", &content.meaning),
        ("Example", &content.example),
        ("Context", &content.context_en),
        ("", &content.context_cn),
        ("Roots", &content.roots),
        ("Synonyms", &content.synonyms),
        ("Tags", &content.tags),
    ];
    for (label, value) in fields {
        if value.trim().is_empty() {
            continue;
        }
        let label = format!("{:>9} ", label);
        let mut wrapped = wrap_lines(value.trim(), "", 70).into_iter();
        if let Some(first) = wrapped.next() {
            lines.push(format!("{}{}", paint(&label, Color::GRAY, use_color), first));
        }
        for rest in wrapped {
            lines.push(format!("{:10}{}", "", rest));
        }
    }

    lines
}

const HEATMAP_LEVELS: [char; 5] = ['.', '\u{2591}', '\u{2592}', '\u{2593}', '\u{2588}'];

fn heatmap_cell(count: usize) -> char {
    match count {
        0 => HEATMAP_LEVELS[0],
        1..=4 => HEATMAP_LEVELS[1],
        5..=9 => HEATMAP_LEVELS[2],
        10..=19 => HEATMAP_LEVELS[3],
        _ => HEATMAP_LEVELS[4],
    }
}

/// Week-column heatmap: one row per weekday, Monday first
pub fn render_heatmap(
    counts: &BTreeMap<NaiveDate, usize>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<String> {
    if end < start {
        return Vec::new();
    }

    // Align the first column to a Monday
    let first_monday = start - Duration::days(start.weekday().num_days_from_monday() as i64);
    let weeks = ((end - first_monday).num_days() / 7 + 1) as usize;
    let labels = ["Mon", "", "Wed", "", "Fri", "", "Sun"];

    let mut rows: Vec<String> = labels.iter().map(|l| format!("{:<4}", l)).collect();
    for week in 0..weeks {
        for (weekday, row) in rows.iter_mut().enumerate() {
            let day = first_monday + Duration::days((week * 7 + weekday) as i64);
            let cell = if day < start || day > end {
                ' '
            } else {
                heatmap_cell(counts.get(&day).copied().unwrap_or(0))
            };
            row.push(cell);
        }
    }

    rows
}
