//! Command-line entry point for `goalkeep_core`.
//!
//! # Responsibility
//! - Verify core linkage (`ping`, version) without the Flutter runtime.
//! - Export a journal entry to a PDF file and print dashboard counters
//!   against a local database.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use goalkeep_core::db::open_db;
use goalkeep_core::repo::goal_repo::StoreGoalRepository;
use goalkeep_core::repo::journal_repo::StoreJournalRepository;
use goalkeep_core::repo::task_repo::StoreTaskRepository;
use goalkeep_core::{
    init_logging_from_config, AppConfig, DashboardService, JournalEntryId, JournalService,
    SqliteDocumentStore, UserId,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "goalkeep", version, about = "GoalKeep core command-line tool")]
struct Cli {
    /// Database file (defaults to the configured store)
    #[arg(long, global = true, env = "GOALKEEP_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print ping and core version
    Ping,
    /// Write one journal entry as PDF
    ExportJournal {
        #[arg(long)]
        user: String,
        #[arg(long)]
        entry: String,
        /// Output file; defaults to the entry's suggested name
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print dashboard counters for a user
    Summary {
        #[arg(long)]
        user: String,
        /// Calendar day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(cli.command.unwrap_or(Command::Ping), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: &AppConfig) -> Result<(), String> {
    match command {
        Command::Ping => {
            println!("goalkeep_core ping={}", goalkeep_core::ping());
            println!("goalkeep_core version={}", goalkeep_core::core_version());
            Ok(())
        }
        Command::ExportJournal { user, entry, out } => {
            let user_id = UserId::parse(&user).map_err(|err| err.to_string())?;
            let entry_id = JournalEntryId::parse(&entry).map_err(|err| err.to_string())?;
            let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
            let store = SqliteDocumentStore::new(&conn);
            let exported = JournalService::new(StoreJournalRepository::new(&store))
                .export_entry_pdf(&user_id, &entry_id)
                .map_err(|err| err.to_string())?;

            let target = out.unwrap_or_else(|| PathBuf::from(&exported.file_name));
            std::fs::write(&target, &exported.bytes)
                .map_err(|err| format!("failed to write `{}`: {err}", target.display()))?;
            println!(
                "wrote {} ({} bytes)",
                target.display(),
                exported.bytes.len()
            );
            Ok(())
        }
        Command::Summary { user, today } => {
            let user_id = UserId::parse(&user).map_err(|err| err.to_string())?;
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
            let store = SqliteDocumentStore::new(&conn);
            let summary = DashboardService::new(
                StoreGoalRepository::new(&store),
                StoreTaskRepository::new(&store),
                StoreJournalRepository::new(&store),
            )
            .summary(&user_id, today)
            .map_err(|err| err.to_string())?;

            println!(
                "goals={} completed={} percent={}",
                summary.total_goals, summary.completed_goals, summary.completion_percent
            );
            println!(
                "milestones={}/{}",
                summary.milestones_done, summary.milestones_total
            );
            println!(
                "open_tasks={} due_today={} overdue={}",
                summary.open_tasks, summary.tasks_due_today, summary.overdue_tasks
            );
            println!("journal_entries={}", summary.journal_entries);
            if let Some(latest) = summary.latest_entry {
                println!("latest_entry={} title={}", latest.id, latest.record.title);
            }
            Ok(())
        }
    }
}
