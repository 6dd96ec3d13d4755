//! Malla CLI - track progress through a curriculum.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use malla_core::{CourseId, Curriculum};
use malla_progress::{
    blocking_message, CourseStatus, ProgressSnapshot, ProgressTracker, Status, ToggleOutcome,
};
use malla_storage::JsonStorage;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "malla")]
#[command(about = "Curriculum progress tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage path for saved progress
    #[arg(short, long, default_value = ".malla")]
    storage: PathBuf,

    /// Curriculum definition (JSON). Defaults to the bundled curriculum
    #[arg(short, long)]
    curriculum: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Course(CourseCommand),
    /// Check the milestone set against the curriculum
    Check,
}

/// Commands that read or change saved progress.
#[derive(Subcommand)]
enum CourseCommand {
    /// List courses with their status
    List {
        /// Only show courses with this status
        #[arg(long)]
        status: Option<Status>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one course's status
    Status {
        /// Course ID
        id: String,
    },
    /// Mark a course completed, or un-complete it
    Toggle {
        /// Course ID
        id: String,
    },
    /// Explain what keeps a course locked
    Missing {
        /// Course ID
        id: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_curriculum(path: Option<&Path>) -> Result<Curriculum> {
    match path {
        Some(path) => {
            debug!("Loading curriculum from {}", path.display());
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            Ok(Curriculum::from_json(&json)?)
        }
        None => Ok(Curriculum::bundled()?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let curriculum = load_curriculum(cli.curriculum.as_deref()).await?;

    match cli.command {
        Commands::Check => print_milestone_check(&curriculum),
        Commands::Course(command) => {
            // Open storage
            let storage = JsonStorage::new(&cli.storage).await?;
            debug!("Progress stored in {}", storage.root().display());
            let mut tracker = ProgressTracker::open(curriculum, storage).await;
            run_course_command(&mut tracker, command).await?;
        }
    }

    Ok(())
}

async fn run_course_command(
    tracker: &mut ProgressTracker<JsonStorage>,
    command: CourseCommand,
) -> Result<()> {
    match command {
        CourseCommand::List { status, json } => {
            let snapshot = tracker.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_snapshot(tracker.engine().curriculum(), &snapshot, status);
            }
        }
        CourseCommand::Status { id } => {
            let id = CourseId::new(id);
            let status = tracker.status_of(&id)?;
            let curriculum = tracker.engine().curriculum();
            let semester = curriculum
                .semester_of(&id)
                .map(|s| format!(" (semester {})", s))
                .unwrap_or_default();
            println!(
                "{} | {} | {}{}",
                id,
                format_status(status),
                curriculum.display_name_of(&id),
                semester
            );
        }
        CourseCommand::Toggle { id } => {
            let id = CourseId::new(id);
            match tracker.toggle(&id).await? {
                ToggleOutcome::Rejected { missing } => {
                    println!("{}", blocking_message(tracker.engine().curriculum(), &missing));
                }
                ToggleOutcome::Completed | ToggleOutcome::Uncompleted => {
                    let status = tracker.status_of(&id)?;
                    println!("{} -> {}", id, format_status(status));
                }
            }
        }
        CourseCommand::Missing { id } => {
            let id = CourseId::new(id);
            let missing = tracker.missing_prerequisites_of(&id)?;
            if missing.is_empty() {
                println!("{} has no missing prerequisites", id);
            } else {
                println!("{}", blocking_message(tracker.engine().curriculum(), &missing));
            }
        }
    }

    Ok(())
}

fn print_milestone_check(curriculum: &Curriculum) {
    let gaps = curriculum.milestone_gaps();
    if gaps.is_empty() {
        println!(
            "Milestone set OK ({} courses, all in the curriculum)",
            curriculum.milestone_set().len()
        );
    } else {
        println!("Milestone courses missing from the curriculum ({})", gaps.len());
        for gap in gaps {
            println!("  - {}", gap);
        }
    }
}

fn print_snapshot(curriculum: &Curriculum, snapshot: &ProgressSnapshot, filter: Option<Status>) {
    let title = if curriculum.name().is_empty() { "Curriculum" } else { curriculum.name() };
    println!(
        "{} ({}/{} completed, {:.0}%)",
        title,
        snapshot.completed,
        snapshot.courses.len(),
        snapshot.percentage()
    );

    let courses: Box<dyn Iterator<Item = &CourseStatus> + '_> = match filter {
        Some(status) => Box::new(snapshot.with_status(status)),
        None => Box::new(snapshot.courses.iter()),
    };

    let mut current_semester = None;
    for course in courses {
        if course.semester != current_semester {
            current_semester = course.semester;
            if let Some(semester) = current_semester {
                println!("Semester {}", semester);
            }
        }
        println!("  {:9} | {} - {}", format_status(course.status), course.id, course.name);
    }

    println!(
        "Completed: {}  Available: {}  Locked: {}",
        snapshot.completed, snapshot.available, snapshot.locked
    );
}

fn format_status(status: Status) -> &'static str {
    match status {
        Status::Completed => "COMPLETED",
        Status::Available => "AVAILABLE",
        Status::Locked => "LOCKED",
    }
}
