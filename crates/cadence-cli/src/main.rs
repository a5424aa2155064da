//! Cadence CLI
//!
//! Command-line front end for the study-sprint engine: plan a sprint,
//! synthesize its exercises, record answers and review sprint history.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cadence_core::content::DEFAULT_NEW_MATERIALS;
use cadence_core::{
    analyze_exercise_types, feedback, format_sprint_result, identify_error_prone_items, recommend,
    score, sprint_statistics, CadenceConfig, Catalog, ExerciseOutcome, LearnerState,
    LearningStats, ProgressStore, SelectionStrategy, SprintPlanner, SprintStatistics, SrsEngine,
    Storage, SynthesisInput, Synthesizer,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use directories::ProjectDirs;
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Cadence - adaptive study sprints
#[derive(Parser)]
#[command(name = "cadence")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plan and run adaptive vocabulary and grammar sprints")]
#[command(long_about = "Cadence schedules study sprints with a level-based spaced repetition engine.\n\nIt plans which items to practice, synthesizes exercises for them and tracks progress between sprints.")]
struct Cli {
    /// Directory holding the progress database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory holding the content catalogs
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List units with their content counts and progress
    Units,

    /// Plan which items the next sprint covers
    Plan {
        /// Unit to plan for (defaults to the current unit)
        #[arg(long)]
        unit: Option<String>,

        /// Target number of items
        #[arg(long)]
        size: Option<usize>,

        /// phase_based or fixed_ratio
        #[arg(long, default_value = "phase_based")]
        strategy: String,
    },

    /// Synthesize exercises for a sprint
    Exercises {
        /// Unit to draw content from (defaults to the current unit)
        #[arg(long)]
        unit: Option<String>,

        /// Requested number of exercises
        #[arg(long, default_value = "10")]
        count: usize,

        /// Practice a single grammar rule
        #[arg(long)]
        grammar: Option<String>,

        /// Allow reading-comprehension questions
        #[arg(long)]
        text: bool,
    },

    /// Record one answer for a vocabulary item
    Answer {
        /// Item id
        item: String,

        #[arg(long, conflicts_with = "incorrect")]
        correct: bool,

        #[arg(long)]
        incorrect: bool,
    },

    /// Score a finished sprint from a JSON file of exercise outcomes
    Complete {
        /// Path to the outcomes JSON array
        outcomes: PathBuf,

        /// Unit the sprint belonged to (defaults to the current unit)
        #[arg(long)]
        unit: Option<String>,

        /// Seconds spent on the sprint
        #[arg(long, default_value = "0")]
        elapsed: u64,

        /// Grammar rule the sprint focused on
        #[arg(long)]
        grammar: Option<String>,
    },

    /// Show learner statistics
    Stats,

    /// Show stored sprints, newest first
    History {
        /// Restrict to one unit
        #[arg(long)]
        unit: Option<String>,

        /// Maximum sprints to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Change the current unit
    SetUnit {
        /// Unit id, e.g. unit2
        unit: String,
    },
}

/// Shared state for every command
struct Session {
    config: CadenceConfig,
    storage: Storage,
    learner: LearnerState,
    content_dir: PathBuf,
    json: bool,
}

impl Session {
    fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config = CadenceConfig::from_env();
        let storage = Storage::new(cli.data_dir.as_ref().map(|d| d.join("cadence.db")))?;
        storage.ensure_open()?;
        info!("Using database at {}", storage.path().display());

        let learner =
            LearnerState::load(&storage)?.with_engine(SrsEngine::with_levels(config.interval_levels));

        Ok(Self {
            config,
            storage,
            learner,
            content_dir: resolve_content_dir(cli.content_dir.clone()),
            json: cli.json,
        })
    }

    async fn catalog(&self) -> anyhow::Result<Catalog> {
        Catalog::load(&self.content_dir)
            .await
            .with_context(|| format!("loading content from {}", self.content_dir.display()))
    }

    fn unit_or_current(&self, unit: Option<String>) -> String {
        unit.unwrap_or_else(|| self.learner.current_unit().to_string())
    }
}

/// Explicit directory, else `./data` when present, else the platform data dir
fn resolve_content_dir(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    let local = Path::new("data");
    if local.is_dir() {
        return local.to_path_buf();
    }
    ProjectDirs::from("com", "cadence", "core")
        .map(|dirs| dirs.data_dir().join("content"))
        .unwrap_or_else(|| local.to_path_buf())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let mut session = Session::open(&cli)?;

    match cli.command {
        Commands::Units => run_units(&session).await,
        Commands::Plan { unit, size, strategy } => run_plan(&session, unit, size, &strategy).await,
        Commands::Exercises {
            unit,
            count,
            grammar,
            text,
        } => run_exercises(&session, unit, count, grammar, text).await,
        Commands::Answer {
            item,
            correct,
            incorrect,
        } => run_answer(&mut session, &item, correct, incorrect),
        Commands::Complete {
            outcomes,
            unit,
            elapsed,
            grammar,
        } => run_complete(&mut session, &outcomes, unit, elapsed, grammar.as_deref()).await,
        Commands::Stats => run_stats(&session),
        Commands::History { unit, limit } => run_history(&session, unit, limit),
        Commands::SetUnit { unit } => run_set_unit(&mut session, &unit).await,
    }
}

// ============================================================================
// UNITS
// ============================================================================

async fn run_units(session: &Session) -> anyhow::Result<()> {
    let catalog = session.catalog().await?;
    let units = catalog.units();

    if session.json {
        return print_json(&units);
    }

    println!("{}", "=== Units ===".cyan().bold());
    println!();
    if units.is_empty() {
        println!("{}", "No units found.".dimmed());
        return Ok(());
    }

    for unit in &units {
        let vocab = catalog.vocabulary_by_unit(&unit.id);
        let stats = session.learner.unit_stats(&unit.id, &vocab);
        let marker = if unit.id == session.learner.current_unit() { "*" } else { " " };
        println!(
            "{} {:10} {:>3} words {:>3} rules {:>3} texts  {}",
            marker.green().bold(),
            unit.id.white().bold(),
            unit.vocab_count,
            unit.grammar_count,
            unit.text_count,
            format!("{}/{} learned ({}%)", stats.learned, stats.total, stats.percentage).dimmed()
        );
    }
    Ok(())
}

// ============================================================================
// PLAN
// ============================================================================

async fn run_plan(session: &Session, unit: Option<String>, size: Option<usize>, strategy: &str) -> anyhow::Result<()> {
    let strategy = SelectionStrategy::parse_name(strategy)
        .with_context(|| format!("unknown strategy '{}', expected phase_based or fixed_ratio", strategy))?;
    let unit = session.unit_or_current(unit);
    let size = size.unwrap_or(session.config.sprint_size);

    let catalog = session.catalog().await?;
    let vocab = catalog.vocabulary_by_unit(&unit);
    let history = session.storage.sprints_by_unit(&unit)?;
    let error_prone = identify_error_prone_items(&history, &vocab, session.config.error_threshold);

    let planner = SprintPlanner::from_config(&session.config, strategy);
    let plan = planner.plan(&vocab, &session.learner, size, &error_prone, Utc::now(), &mut rand::thread_rng());
    let advice = recommend(&plan);

    if session.json {
        return print_json(&serde_json::json!({ "plan": plan, "recommendation": advice }));
    }

    println!("{}", format!("=== Sprint Plan: {} ===", unit).cyan().bold());
    println!();
    println!("{}: {}", "Phase".white().bold(), plan.metadata.phase);
    println!("{}: {}", "Strategy".white().bold(), plan.metadata.strategy);
    println!(
        "{}: {} of {}",
        "Items".white().bold(),
        plan.metadata.actual_size,
        plan.metadata.target_size
    );
    println!(
        "{}: {}% new / {}% review",
        "Mix".white().bold(),
        plan.statistics.new_items_percentage,
        plan.statistics.review_items_percentage
    );
    println!("{}: {}", "Focus".white().bold(), plan.statistics.priority_focus);
    println!(
        "{}: {}% complete, {} due",
        "Readiness".white().bold(),
        plan.readiness.completion_percentage,
        plan.readiness.due_for_review
    );

    println!();
    for item in &plan.items {
        let flag = if error_prone.contains(&item.id) { "!".red().bold() } else { " ".normal() };
        println!(
            "  {} {:8} {:20} {:12} level {} ({}%)",
            flag,
            item.id,
            item.word,
            item.status.as_str(),
            item.level,
            item.accuracy
        );
    }

    println!();
    println!("{}", "=== Recommendation ===".yellow().bold());
    println!("{}", plan.distribution.recommendation);
    println!(
        "{}: {} sprints/day, {}",
        "Pace".white().bold(),
        advice.daily_goal,
        advice.estimated_time_to_completion.description
    );
    println!("{}: {}", "Focus areas".white().bold(), advice.focus_areas.join(", "));
    println!("{}", advice.next_step.dimmed());
    Ok(())
}

// ============================================================================
// EXERCISES
// ============================================================================

async fn run_exercises(
    session: &Session,
    unit: Option<String>,
    count: usize,
    grammar: Option<String>,
    with_texts: bool,
) -> anyhow::Result<()> {
    let unit = session.unit_or_current(unit);
    let catalog = session.catalog().await?;
    let synthesizer = Synthesizer::from_config(&session.config);
    let mut rng = rand::thread_rng();

    let exercises = match grammar {
        Some(id) => {
            let rule = catalog
                .grammar_by_id(&id)
                .with_context(|| format!("no grammar rule '{}'", id))?;
            let vocab = catalog.vocabulary_by_unit(&rule.unit);
            let input = SynthesisInput::focused(&vocab, &catalog.templates, rule);
            synthesizer.synthesize(&input, count, &mut rng)
        }
        None => {
            let materials =
                catalog.sprint_materials(&unit, &session.learner, DEFAULT_NEW_MATERIALS, Utc::now());
            let mut input = SynthesisInput::unfocused(&materials.vocabulary, &materials.templates)
                .with_grammar(&materials.grammar);
            if with_texts {
                input = input.with_texts(&materials.texts);
            }
            synthesizer.synthesize(&input, count, &mut rng)
        }
    };

    if session.json {
        return print_json(&exercises);
    }

    println!("{}", format!("=== Exercises: {} ===", unit).cyan().bold());
    println!();
    if exercises.is_empty() {
        println!("{}", "No exercises could be built for this unit.".dimmed());
        return Ok(());
    }

    for (n, exercise) in exercises.iter().enumerate() {
        println!(
            "{:>2}. [{}] {}",
            n + 1,
            exercise.kind().as_str().yellow(),
            exercise.question().unwrap_or("match the pairs")
        );
        if !exercise.options().is_empty() {
            println!("    {}", exercise.options().join(" | ").dimmed());
        }
        for pair in exercise.pairs() {
            println!("    {} -> ?", pair.source.dimmed());
        }
        println!("    {} {}", "answer:".green(), exercise.correct);
        if let Some(hint) = &exercise.hint {
            println!("    {} {}", "hint:".dimmed(), hint.dimmed());
        }
    }
    Ok(())
}

// ============================================================================
// ANSWER
// ============================================================================

fn run_answer(session: &mut Session, item: &str, correct: bool, incorrect: bool) -> anyhow::Result<()> {
    if correct == incorrect {
        anyhow::bail!("pass exactly one of --correct or --incorrect");
    }

    let record = session
        .learner
        .record_answer(&session.storage, item, correct, Utc::now())?;

    if session.json {
        return print_json(&record);
    }

    match record {
        Some(record) => {
            println!(
                "{} {} -> level {}, next review {}",
                if correct { "✓".green().bold() } else { "✗".red().bold() },
                item.white().bold(),
                record.level,
                record.next_review.format("%Y-%m-%d %H:%M")
            );
        }
        None => println!("{} {} stays untracked", "✗".red().bold(), item.white().bold()),
    }
    Ok(())
}

// ============================================================================
// COMPLETE
// ============================================================================

async fn run_complete(
    session: &mut Session,
    path: &Path,
    unit: Option<String>,
    elapsed: u64,
    grammar: Option<&str>,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let outcomes: Vec<ExerciseOutcome> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let unit = session.unit_or_current(unit);
    let now = Utc::now();

    let updated = session.learner.record_outcomes(&session.storage, &outcomes)?;
    let by_type = analyze_exercise_types(&outcomes);
    let stats = score(&outcomes, elapsed, now);
    let result = format_sprint_result(stats, &unit, grammar, outcomes);
    let advice = feedback(&result.stats);
    session
        .learner
        .complete_sprint(&session.storage, &result, now.date_naive())?;

    if session.json {
        return print_json(&serde_json::json!({
            "result": result,
            "feedback": advice,
            "byType": by_type,
            "itemsUpdated": updated,
        }));
    }

    let stats = &result.stats;
    println!("{}", "=== Sprint Complete ===".cyan().bold());
    println!();
    println!("{}: {}", "Sprint".white().bold(), result.id);
    println!(
        "{}: {}/{} ({}%)",
        "Score".white().bold(),
        stats.correct,
        stats.total,
        stats.accuracy
    );
    println!("{}: {}", "Grade".white().bold(), stats.grade.to_string().bold());
    println!(
        "{}: {} min, {} exercises/min",
        "Time".white().bold(),
        stats.minutes_taken,
        stats.exercises_per_minute
    );
    println!("{}: {}", "Items updated".white().bold(), updated);
    println!("{}: {} days", "Streak".white().bold(), session.learner.streak_days());

    if !by_type.is_empty() {
        println!();
        println!("{}", "=== By Exercise Type ===".yellow().bold());
        for (kind, t) in &by_type {
            println!("  {:16} {:>3}/{:<3} {:>3}%", kind.as_str(), t.correct, t.total, t.accuracy);
        }
    }

    println!();
    let message = if advice.should_repeat {
        advice.message.yellow().bold()
    } else {
        advice.message.green().bold()
    };
    println!("{}", message);
    println!("{}", advice.recommendation);
    Ok(())
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport<'a> {
    current_unit: &'a str,
    total_sprints: u32,
    streak_days: u32,
    learning: LearningStats,
    sprints: SprintStatistics,
}

fn run_stats(session: &Session) -> anyhow::Result<()> {
    let report = StatsReport {
        current_unit: session.learner.current_unit(),
        total_sprints: session.learner.total_sprints(),
        streak_days: session.learner.streak_days(),
        learning: session.learner.learning_stats(),
        sprints: sprint_statistics(&session.storage, None)?,
    };

    if session.json {
        return print_json(&report);
    }

    println!("{}", "=== Cadence Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Current Unit".white().bold(), report.current_unit);
    println!("{}: {}", "Total Sprints".white().bold(), report.total_sprints);
    println!("{}: {} days", "Streak".white().bold(), report.streak_days);
    if let Some(last) = session.learner.last_sprint_date() {
        println!("{}: {}", "Last Sprint".white().bold(), last.format("%Y-%m-%d"));
    }

    println!();
    println!("{}", "=== Progress ===".yellow().bold());
    let learning = &report.learning;
    println!("{}: {}", "Tracked Items".white().bold(), learning.total_items);
    println!("{}: {}", "Learned".white().bold(), learning.total_learned);
    println!("{}: {:.1}", "Average Level".white().bold(), learning.average_level);
    println!(
        "{}: {}% ({} of {} answers)",
        "Accuracy".white().bold(),
        learning.accuracy,
        learning.total_correct,
        learning.total_attempts
    );

    println!();
    println!("{}", "=== Recent Sprints ===".magenta().bold());
    let sprints = &report.sprints;
    if sprints.total_sprints == 0 {
        println!("{}", "No sprints yet.".dimmed());
    } else {
        println!("{}: {}", "Sprints".white().bold(), sprints.total_sprints);
        println!("{}: {}%", "Average Accuracy".white().bold(), sprints.average_accuracy);
        println!("{}: {}%", "Best Accuracy".white().bold(), sprints.best_accuracy);
    }
    Ok(())
}

// ============================================================================
// HISTORY
// ============================================================================

fn run_history(session: &Session, unit: Option<String>, limit: usize) -> anyhow::Result<()> {
    let sprints = match &unit {
        Some(unit) => {
            let mut sprints = session.storage.sprints_by_unit(unit)?;
            sprints.truncate(limit);
            sprints
        }
        None => session.storage.recent_sprints(limit)?,
    };

    if session.json {
        return print_json(&sprints);
    }

    println!("{}", "=== Sprint History ===".cyan().bold());
    println!();
    if sprints.is_empty() {
        println!("{}", "No sprints recorded.".dimmed());
        return Ok(());
    }

    for sprint in &sprints {
        let grade = sprint.stats.grade.to_string();
        let grade = if sprint.stats.accuracy >= 80 {
            grade.green()
        } else if sprint.stats.accuracy >= 60 {
            grade.yellow()
        } else {
            grade.red()
        };
        println!(
            "{}  {:8} {:>3}%  {}  {}/{}  {}",
            sprint.date.format("%Y-%m-%d %H:%M"),
            sprint.unit_id,
            sprint.stats.accuracy,
            grade.bold(),
            sprint.stats.correct,
            sprint.stats.total,
            sprint.id.dimmed()
        );
    }
    Ok(())
}

// ============================================================================
// SET UNIT
// ============================================================================

async fn run_set_unit(session: &mut Session, unit: &str) -> anyhow::Result<()> {
    // Unknown units are allowed so content can be added later
    match session.catalog().await {
        Ok(catalog) if !catalog.units().iter().any(|u| u.id == unit) => {
            tracing::warn!("Unit {} has no content in {}", unit, session.content_dir.display());
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Could not check unit against content: {:#}", e),
    }

    session.learner.set_current_unit(&session.storage, unit)?;

    if session.json {
        return print_json(&serde_json::json!({ "currentUnit": session.learner.current_unit() }));
    }
    println!("{} {}", "Current unit:".white().bold(), session.learner.current_unit().green());
    Ok(())
}
