//! Interactive quiz loop
//!
//! There is no audio here: a round "plays" for `presentation_seconds` while
//! the learner tries to name the song. Pressing Enter reveals early; otherwise
//! a timer thread ends the presentation and the round counts as timed out.

use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use colored::Colorize;
use refrain_core::analytics::ProblemItemsPolicy;
use refrain_core::{
    Outcome, QuizMode, QuizSession, RevealHandle, SessionError, SessionFactory, TIMEOUT_LATENCY,
};

use crate::Context;

pub(crate) fn run_quiz(ctx: &Context, mode: QuizMode) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let analytics = &ctx.config.analytics;

    let factory = SessionFactory::new(storage.clone(), storage.clone())
        .with_config(ctx.config.session_config())
        .with_gauntlet_policy(Arc::new(ProblemItemsPolicy::new(
            storage.clone(),
            analytics.problem_min_attempts,
            analytics.problem_limit,
        )));

    let mut session = match factory.start_session(mode, &mut rand::thread_rng()) {
        Ok(session) => session,
        Err(SessionError::NoEligibleItems { mode }) => {
            println!(
                "{}",
                match mode {
                    QuizMode::Standard => "Nothing is due today. Try a challenge instead.",
                    QuizMode::Challenge => "The library is empty. Add songs with `refrain add`.",
                    QuizMode::Gauntlet => "No problem songs yet. Play a few more rounds first.",
                }
                .yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{}",
        format!("=== {} Quiz: {} songs ===", title_case(mode.as_str()), session.items().len())
            .cyan()
            .bold()
    );
    println!("{}", "Press Enter to reveal, answer y/n, q to stop.".dimmed());

    let presentation = Duration::from_secs(ctx.config.quiz.presentation_seconds);

    while !session.is_finished() {
        let (answered, total) = session.progress();
        println!();
        println!("{}", format!("Round {}/{}", answered + 1, total).white().bold());

        let Some(item) = session.current_item()? else {
            anyhow::bail!("Song was removed from the library during the quiz");
        };
        let hints: Vec<String> = [
            item.release_year.map(|y| y.to_string()),
            item.genre.clone(),
            item.language.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !hints.is_empty() {
            println!("  {} {}", "Hints:".dimmed(), hints.join(", ").dimmed());
        }

        let handle = session.begin_round()?;
        present(&handle, presentation)?;

        let latency = handle.latency().unwrap_or(TIMEOUT_LATENCY);
        let timing = if latency == TIMEOUT_LATENCY {
            "timed out".red().to_string()
        } else {
            format!("{:.2}s", latency)
        };
        println!("  {} {}  ({})", "Answer:".white().bold(), item.display_name().green(), timing);

        let Some(outcome) = ask_outcome()? else {
            finish(session, true);
            return Ok(());
        };

        submit_with_retry(&mut session, outcome)?;
    }

    finish(session, false);
    Ok(())
}

/// Block until Enter or the presentation timer, whichever comes first
fn present(handle: &RevealHandle, presentation: Duration) -> anyhow::Result<()> {
    print!("  {} ", "Listening...".cyan());
    io::stdout().flush()?;

    let (cancel, cancelled) = mpsc::channel::<()>();
    let timer_handle = handle.clone();
    let timer = thread::spawn(move || {
        if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(presentation)
            && timer_handle.presentation_finished()
        {
            print!("{} ", "time's up, press Enter".red());
            let _ = io::stdout().flush();
        }
    });

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    handle.reveal();

    drop(cancel);
    let _ = timer.join();
    Ok(())
}

fn ask_outcome() -> anyhow::Result<Option<Outcome>> {
    loop {
        print!("  Did you get it? [y/n/q] ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(Some(Outcome::Correct)),
            "n" | "no" => return Ok(Some(Outcome::Incorrect)),
            "q" | "quit" => return Ok(None),
            _ => continue,
        }
    }
}

fn submit_with_retry(session: &mut QuizSession, outcome: Outcome) -> anyhow::Result<()> {
    loop {
        match session.submit_outcome(outcome) {
            Ok(summary) => {
                let verdict = if summary.outcome.is_correct() {
                    "Correct".green().bold()
                } else {
                    "Missed".red().bold()
                };
                match summary.new_state {
                    Some(state) => println!(
                        "  {} next in {} day{} (ease {:.2})",
                        verdict,
                        state.current_interval_days,
                        if state.current_interval_days == 1 { "" } else { "s" },
                        state.ease_factor
                    ),
                    None => println!("  {}", verdict),
                }
                return Ok(());
            }
            Err(SessionError::Persistence(e)) => {
                eprintln!("  {} Could not save this round: {}", "ERR".red(), e);
                if !crate::confirm("  Retry?")? {
                    anyhow::bail!("Quiz stopped, the last round was not saved");
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn finish(session: QuizSession, aborted: bool) {
    let (answered, total) = session.progress();
    println!();
    println!("{}", "=== Results ===".cyan().bold());
    println!(
        "{}: {}/{}",
        "Score".white().bold(),
        session.score(),
        answered
    );
    if aborted {
        println!("{}", format!("Stopped after {} of {} songs.", answered, total).yellow());
    }
    if !session.failed_items().is_empty() {
        let ids: Vec<String> = session.failed_items().iter().map(|id| format!("#{}", id)).collect();
        println!("{}: {}", "Still missed".red().bold(), ids.join(" "));
    }

    if aborted {
        session.abort();
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
