//! Refrain CLI
//!
//! Command-line interface for the song memorization engine.

mod quiz;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use colored::Colorize;
use refrain_core::analytics::{
    mastery_distribution, practice_history, rank_problem_items, reconstruct_mastery,
};
use refrain_core::config::default_config_path;
use refrain_core::{
    discover_new_files, Clock, NewItem, QuizMode, RefrainConfig, Storage, StorageError, SystemClock,
};
use tracing_subscriber::EnvFilter;

/// Refrain - learn to recognise songs from a few seconds of audio
#[derive(Parser, Debug)]
#[command(name = "refrain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spaced-repetition song quiz")]
#[command(long_about = "Refrain schedules your song library with spaced repetition.\n\nQuiz yourself on what is due, challenge yourself with a random sample, or run a gauntlet of the songs you keep missing.")]
struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Library database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a song to the library
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        artist: String,
        /// Audio file name inside the music folder
        #[arg(long)]
        file: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        /// Spotify track id
        #[arg(long)]
        spotify_id: Option<String>,
    },

    /// List songs with their schedule
    List {
        #[arg(long)]
        json: bool,
    },

    /// List audio files in a music folder that are not in the library yet
    Scan {
        /// Music folder to scan recursively
        folder: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Remove a song (its play history is kept)
    Remove {
        id: i64,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Run a quiz session
    Quiz {
        /// standard, challenge or gauntlet
        #[arg(long, default_value = "standard")]
        mode: QuizMode,
    },

    /// Show library statistics
    Stats,

    /// Songs with the longest current run of misses
    Problems {
        #[arg(long)]
        min_attempts: Option<u32>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },

    /// Mastered songs per day, rebuilt from the play history
    Mastery {
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        json: bool,
    },

    /// Attempts and correct answers per day
    History {
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        json: bool,
    },

    /// Create a consistent copy of the library database
    Backup {
        /// Output file path for the backup
        output: PathBuf,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = RefrainConfig::load(cli.config.as_deref())?;
    let ctx = Context {
        config,
        db: cli.db,
        config_path: cli.config,
    };

    match cli.command {
        Commands::Add {
            title,
            artist,
            file,
            year,
            language,
            genre,
            spotify_id,
        } => run_add(
            &ctx,
            NewItem {
                title,
                artist,
                release_year: year,
                language,
                genre,
                local_filename: file,
                spotify_id,
            },
        ),
        Commands::List { json } => run_list(&ctx, json),
        Commands::Scan { folder, json } => run_scan(&ctx, &folder, json),
        Commands::Remove { id, yes } => run_remove(&ctx, id, yes),
        Commands::Quiz { mode } => quiz::run_quiz(&ctx, mode),
        Commands::Stats => run_stats(&ctx),
        Commands::Problems {
            min_attempts,
            limit,
            json,
        } => run_problems(&ctx, min_attempts, limit, json),
        Commands::Mastery { days, json } => run_mastery(&ctx, days, json),
        Commands::History { days, json } => run_history(&ctx, days, json),
        Commands::Backup { output } => run_backup(&ctx, output),
        Commands::Config { action } => run_config(&ctx, action),
    }
}

/// Settings shared by every command
pub(crate) struct Context {
    pub config: RefrainConfig,
    db: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

impl Context {
    pub fn open_storage(&self) -> anyhow::Result<Arc<Storage>> {
        let path = self
            .db
            .clone()
            .or_else(|| self.config.storage.database_path.clone());
        Ok(Arc::new(Storage::new(path)?))
    }
}

/// Run add command
fn run_add(ctx: &Context, input: NewItem) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;

    match storage.add_item(input) {
        Ok(item) => {
            println!(
                "{} {} {}",
                "Added".green().bold(),
                format!("#{}", item.id).dimmed(),
                item.display_name()
            );
            Ok(())
        }
        Err(StorageError::Duplicate(msg)) => {
            println!("{} {}", "Not added:".yellow().bold(), msg);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run list command
fn run_list(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let items = storage.list_items()?;
    let states: std::collections::HashMap<_, _> =
        storage.get_all_scheduling_states()?.into_iter().collect();

    if json {
        let rows: Vec<_> = items
            .iter()
            .map(|item| {
                serde_json::json!({
                    "item": item,
                    "schedule": states.get(&item.id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", "=== Song Library ===".cyan().bold());
    println!();

    if items.is_empty() {
        println!("{}", "No songs yet. Add one with `refrain add`.".dimmed());
        return Ok(());
    }

    let today = SystemClock.today();
    for item in &items {
        let schedule = match states.get(&item.id) {
            Some(state) if state.is_due(today) => "due".yellow().to_string(),
            Some(state) => format!(
                "{}d, next {}",
                state.current_interval_days,
                state.next_due_date.format("%Y-%m-%d")
            )
            .dimmed()
            .to_string(),
            None => "unscheduled".red().to_string(),
        };
        println!(
            "  {:>5}  {}  [{}]",
            format!("#{}", item.id).dimmed(),
            item.display_name(),
            schedule
        );
    }
    println!();
    println!("{}: {}", "Total".white().bold(), items.len());

    Ok(())
}

/// Run remove command
fn run_remove(ctx: &Context, id: i64, yes: bool) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;

    let Some(item) = storage.get_item(id)? else {
        anyhow::bail!("No song with id {}", id);
    };

    if !yes && !confirm(&format!("Remove {}?", item.display_name()))? {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    if storage.delete_item(id)? {
        println!("{} {}", "Removed".green().bold(), item.display_name());
    }
    Ok(())
}

/// Run stats command
fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let stats = storage.get_stats(SystemClock.today())?;

    println!("{}", "=== Refrain Statistics ===".cyan().bold());
    println!();

    println!("{}: {}", "Songs".white().bold(), stats.total_items);
    println!("{}: {}", "Due Today".white().bold(), stats.due_items);
    println!("{}: {}", "Rounds Played".white().bold(), stats.total_reviews);
    if let Some(accuracy) = stats.accuracy() {
        println!("{}: {:.1}%", "Accuracy".white().bold(), accuracy * 100.0);
    }
    if let Some(oldest) = stats.oldest_item {
        println!("{}: {}", "First Song Added".white().bold(), oldest.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(last) = stats.last_review {
        println!("{}: {}", "Last Played".white().bold(), last.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    println!("{}", "=== Mastery ===".yellow().bold());
    let distribution = mastery_distribution(storage.as_ref())?;
    let total = distribution.total() as usize;
    if total > 0 {
        print_distribution_bar("Not Yet Learned", distribution.not_yet_learned as usize, total, "red");
        print_distribution_bar("Learning", distribution.learning as usize, total, "yellow");
        print_distribution_bar("Mastered", distribution.mastered as usize, total, "green");
    } else {
        println!("{}", "No songs found.".dimmed());
    }

    Ok(())
}

/// Run problems command
fn run_problems(
    ctx: &Context,
    min_attempts: Option<u32>,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let min_attempts = min_attempts.unwrap_or(ctx.config.analytics.problem_min_attempts);
    let limit = limit.unwrap_or(ctx.config.analytics.problem_limit);

    let problems = rank_problem_items(storage.as_ref(), min_attempts, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&problems)?);
        return Ok(());
    }

    println!("{}", "=== Problem Songs ===".cyan().bold());
    println!();

    if problems.is_empty() {
        println!(
            "{}",
            format!("No songs with at least {} attempts.", min_attempts).dimmed()
        );
        return Ok(());
    }

    println!(
        "  {:<40} {:>7} {:>9} {:>8}",
        "Song".white().bold(),
        "Streak".white().bold(),
        "Success".white().bold(),
        "Played".white().bold()
    );
    for problem in &problems {
        let name = match storage.get_item(problem.item_id)? {
            Some(item) => item.display_name(),
            None => format!("(removed #{})", problem.item_id),
        };
        println!(
            "  {:<40} {:>7} {:>8.0}% {:>8}",
            truncate(&name, 40),
            problem.loss_streak.to_string().red(),
            problem.success_rate * 100.0,
            problem.attempts
        );
    }

    Ok(())
}

/// Run mastery command
fn run_mastery(ctx: &Context, days: Option<u32>, json: bool) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let days = days.unwrap_or(ctx.config.analytics.mastery_window_days);

    let series = reconstruct_mastery(storage.as_ref(), storage.as_ref(), days, SystemClock.today())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    println!("{}", "=== Mastered Songs Over Time ===".cyan().bold());
    println!();

    let peak = series.iter().map(|p| p.mastered).max().unwrap_or(0) as usize;
    for point in &series {
        print_distribution_bar(
            &point.date.format("%Y-%m-%d").to_string(),
            point.mastered as usize,
            peak.max(1),
            "green",
        );
    }

    Ok(())
}

/// Run history command
fn run_history(ctx: &Context, days: Option<u32>, json: bool) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let days = days.unwrap_or(ctx.config.analytics.history_days);

    let history = practice_history(storage.as_ref(), days, SystemClock.today())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    println!("{}", "=== Practice History ===".cyan().bold());
    println!();

    let busiest = history.iter().map(|d| d.attempts).max().unwrap_or(0) as usize;
    for day in &history {
        let label = day.date.format("%a %m-%d").to_string();
        if day.attempts == 0 {
            println!("  {:15} {}", label, "-".dimmed());
            continue;
        }
        print_distribution_bar(&label, day.attempts as usize, busiest, "magenta");
        println!(
            "  {:15} {} correct",
            "",
            format!("{}/{}", day.correct, day.attempts).green()
        );
    }

    Ok(())
}

/// Run scan command
fn run_scan(ctx: &Context, folder: &Path, json: bool) -> anyhow::Result<()> {
    let storage = ctx.open_storage()?;
    let known: Vec<String> = storage
        .list_items()?
        .into_iter()
        .map(|item| item.local_filename)
        .collect();

    let found = discover_new_files(folder, &known)
        .with_context(|| format!("Failed to scan {}", folder.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    println!("{}", "=== New Songs ===".cyan().bold());
    println!();

    if found.is_empty() {
        println!("{}", "No new audio files found.".dimmed());
        return Ok(());
    }

    for path in &found {
        println!("  {}", path.display());
    }
    println!();
    println!(
        "{} new file(s). Add one with: {}",
        found.len().to_string().bold(),
        "refrain add --title <T> --artist <A> --file <NAME>".dimmed()
    );

    Ok(())
}

/// Run backup command
fn run_backup(ctx: &Context, output: PathBuf) -> anyhow::Result<()> {
    println!("{}", "=== Refrain Backup ===".cyan().bold());
    println!();

    if output.exists() {
        anyhow::bail!("Refusing to overwrite existing file: {}", output.display());
    }
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let storage = ctx.open_storage()?;
    storage.backup_to(&output)?;

    let file_size = std::fs::metadata(&output)?.len();
    println!(
        "{}",
        format!("Backup complete: {} ({})", output.display(), format_size(file_size))
            .green()
            .bold()
    );

    Ok(())
}

/// Run config command
fn run_config(ctx: &Context, action: ConfigAction) -> anyhow::Result<()> {
    let path = ctx
        .config_path
        .clone()
        .or_else(default_config_path)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            RefrainConfig::default().save(&path)?;
            println!("{} {}", "Wrote".green().bold(), path.display());
        }
        ConfigAction::Show => {
            println!("{} {}", "#".dimmed(), describe_path(&path).dimmed());
            print!("{}", ctx.config.to_toml_string()?);
        }
    }

    Ok(())
}

fn describe_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not created, showing defaults)", path.display())
    }
}

// ============================================================================
// OUTPUT HELPERS
// ============================================================================

pub(crate) fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

fn print_distribution_bar(label: &str, count: usize, total: usize, color: &str) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);

    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));
    let colored_bar = match color {
        "green" => bar.green(),
        "yellow" => bar.yellow(),
        "red" => bar.red(),
        "magenta" => bar.magenta(),
        _ => bar.white(),
    };

    println!("  {:15} [{:30}] {:>4}", label, colored_bar, count);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}
