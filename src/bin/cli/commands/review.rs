use std::io::{self, BufRead, Write};

use anyhow::Result;

use vocab_lib::review::{
    CardPhase, CardView, GradeOutcome, GradeSignal, ReviewError, ReviewMethod, ReviewSession,
    SessionSummary,
};
use vocab_lib::scheduling::{format_interval, preview_intervals, Quality};

use crate::app::App;
use crate::render::terminal::{cloze, paint, render_details, Color};
use crate::OutputFormat;

/// What the user asked for at a prompt
enum Step {
    Continue,
    Quit,
}

pub fn run(
    app: &App,
    cram: bool,
    spelling: bool,
    seed: Option<u64>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut options = app.config.session_options();
    options.cram |= cram;
    if spelling {
        options.method = ReviewMethod::Production;
    }

    let session = app.start_session(options, seed)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    while !session.is_finished() {
        let card = match session.current() {
            Ok(card) => card,
            Err(ReviewError::EmptyQueue) => break,
            Err(e) => return Err(e.into()),
        };

        let progress = session.progress();
        println!();
        println!(
            "{}",
            paint(
                &format!("[{}/{}] {} left", progress.completed, progress.total, progress.remaining),
                Color::GRAY,
                use_color
            )
        );

        let step = match options.method {
            ReviewMethod::Recognition => recognition_card(&session, &card, &mut input, use_color)?,
            ReviewMethod::Production => production_card(&session, &card, &mut input, use_color)?,
        };
        if let Step::Quit = step {
            break;
        }
    }

    print_summary(&session.summary()?, format)
}

/// Flashcard: show the word, reveal on Enter, rate 1-3
fn recognition_card(
    session: &ReviewSession,
    card: &CardView,
    input: &mut impl BufRead,
    use_color: bool,
) -> Result<Step> {
    let record = &card.record;
    print_front(&record.word, &record.content.phonetic, use_color);

    if card.phase == CardPhase::Presenting {
        if !record.content.example.is_empty() {
            println!("  {}", cloze(&record.content.example, &record.word));
        }
        match prompt(input, "Enter to reveal, q to quit: ")? {
            Some(line) if line.trim() == "q" => return Ok(Step::Quit),
            Some(_) => {}
            None => return Ok(Step::Quit),
        }
        session.reveal(card.ticket)?;
    }

    for line in render_details(record, use_color) {
        println!("{}", line);
    }

    let preview = preview_intervals(record.sm2_state(), record.stage);
    let question = format!(
        "1) forgot {}  2) vague {}  3) familiar {}  q) quit: ",
        format_interval(preview[0]),
        format_interval(preview[1]),
        format_interval(preview[2])
    );

    loop {
        let Some(line) = prompt(input, &question)? else {
            return Ok(Step::Quit);
        };
        let line = line.trim();
        if line == "q" {
            return Ok(Step::Quit);
        }

        let quality = line.parse::<u8>().ok().and_then(Quality::from_button);
        match quality {
            Some(quality) => {
                grade(session, card, GradeSignal::Quality(quality), use_color);
                return Ok(Step::Continue);
            }
            None => println!("Choose 1, 2 or 3."),
        }
    }
}

/// Spelling: show the meaning, type the word, Enter to move on
fn production_card(
    session: &ReviewSession,
    card: &CardView,
    input: &mut impl BufRead,
    use_color: bool,
) -> Result<Step> {
    let record = &card.record;

    let check = match (&card.phase, &card.answer) {
        (CardPhase::Revealed, Some(check)) => check.clone(),
        _ => {
            println!("{}", paint(&record.content.meaning, Color::BOLD, use_color));
            if !record.content.example.is_empty() {
                println!("  {}", cloze(&record.content.example, &record.word));
            }
            let Some(given) = prompt(input, "Spelling (:q to quit): ")? else {
                return Ok(Step::Quit);
            };
            if given.trim() == ":q" {
                return Ok(Step::Quit);
            }
            match session.check_answer(card.ticket, &given)? {
                Some(check) => check,
                None => return Ok(Step::Continue),
            }
        }
    };

    if check.correct {
        println!("{}", paint("Correct", Color::GREEN, use_color));
    } else {
        println!(
            "{} {}",
            paint("Wrong, it is", Color::RED, use_color),
            paint(&check.expected, Color::BOLD, use_color)
        );
    }
    print_front(&record.word, &record.content.phonetic, use_color);
    for line in render_details(record, use_color) {
        println!("{}", line);
    }

    if prompt(input, "Enter to continue, q to quit: ")?.map_or(true, |l| l.trim() == "q") {
        return Ok(Step::Quit);
    }

    match session.confirm(card.ticket) {
        Ok(outcome) => report(outcome, &record.word, use_color),
        Err(e) => eprintln!("Could not save review of '{}': {}. Try again.", record.word, e),
    }
    Ok(Step::Continue)
}

fn grade(session: &ReviewSession, card: &CardView, signal: GradeSignal, use_color: bool) {
    match session.grade(card.ticket, signal) {
        Ok(outcome) => report(outcome, &card.record.word, use_color),
        // The card stays in front and can be graded again
        Err(e) => eprintln!("Could not save review of '{}': {}. Try again.", card.record.word, e),
    }
}

fn report(outcome: GradeOutcome, word: &str, use_color: bool) {
    match outcome {
        GradeOutcome::Completed | GradeOutcome::Ignored => {}
        GradeOutcome::Requeued { .. } => {
            println!("{}", paint("Will come back later in this session", Color::YELLOW, use_color));
        }
        GradeOutcome::Dropped => {
            println!("'{}' is no longer in the vocabulary, skipped", word);
        }
    }
}

fn print_front(word: &str, phonetic: &str, use_color: bool) {
    if phonetic.is_empty() {
        println!("{}", paint(word, Color::BOLD, use_color));
    } else {
        println!(
            "{}  {}",
            paint(word, Color::BOLD, use_color),
            paint(phonetic, Color::CYAN, use_color)
        );
    }
}

/// Print `question` and read one line; `None` at end of input
fn prompt(input: &mut impl BufRead, question: &str) -> Result<Option<String>> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line))
}

fn print_summary(summary: &SessionSummary, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Plain => {
            println!();
            if summary.total == 0 {
                println!("Nothing to review right now.");
            } else {
                println!("Reviewed {} of {} words.", summary.completed, summary.total);
            }
            if summary.cram {
                println!("Cram session: every word was included.");
            }
            println!("{} words scheduled for later.", summary.scheduled_later);
        }
    }
    Ok(())
}
