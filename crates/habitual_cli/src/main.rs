//! Command-line front end for the habit store.
//!
//! # Responsibility
//! - Drive `habitual_core` against a local SQLite slot database.
//! - Gate toggles by date the same way the weekly/monthly views do.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use habitual_core::db::open_db;
use habitual_core::{
    can_toggle, default_log_level, init_logging, week_cells, DayStatus, HabitId, HabitStore,
    SlotRepository, SqliteSlotRepository, ToggleWindow, DEFAULT_COLOR, DEFAULT_ICON,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const DB_FILE_NAME: &str = "habitual.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "habitual", version, about = "Track daily habits from the terminal")]
struct Cli {
    /// SQLite database file. Defaults to the platform data directory.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List habits in display order.
    List,
    /// Create a habit.
    Add {
        name: String,
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
        #[arg(long, default_value = DEFAULT_ICON)]
        icon: String,
    },
    /// Change name, color or icon of a habit.
    Rename {
        id: String,
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a habit and its history.
    Delete { id: String },
    /// Flip completion for a day (today by default).
    Toggle {
        id: String,
        /// Day as YYYY-MM-DD; must not be in the future.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Move a habit to the position of another.
    Move { dragged: String, target: String },
    /// Show the current week for one habit.
    Week { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    let db_path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    let conn = open_db(&db_path)?;
    let mut store = HabitStore::new(SqliteSlotRepository::new(&conn));
    store.load();
    let today = Local::now().date_naive();

    match cli.command {
        Command::List => {
            for habit in store.habits() {
                println!(
                    "{}  {:<24} {} {}  done={}",
                    short_id(habit.id),
                    habit.name,
                    habit.color,
                    habit.icon,
                    habit.completion_count()
                );
            }
        }
        Command::Add { name, color, icon } => {
            let id = store.add_habit(&name, color, icon)?;
            println!("added {}", short_id(id));
        }
        Command::Rename {
            id,
            name,
            color,
            icon,
        } => {
            let id = resolve_id(&store, &id)?;
            let current = store.get(id).ok_or("habit disappeared")?;
            let color = color.unwrap_or_else(|| current.color.clone());
            let icon = icon.unwrap_or_else(|| current.icon.clone());
            store.update_habit(id, &name, color, icon)?;
            println!("updated {}", short_id(id));
        }
        Command::Delete { id } => {
            let id = resolve_id(&store, &id)?;
            if !store.delete_habit(id) {
                return Err(format!("no such habit {id}").into());
            }
            println!("deleted {}", short_id(id));
        }
        Command::Toggle { id, date } => {
            let id = resolve_id(&store, &id)?;
            let day = date.unwrap_or(today);
            if !can_toggle(day, today, ToggleWindow::UpToToday) {
                return Err(format!("cannot toggle future day {day}").into());
            }
            let completed = store.toggle_completion(id, day)?;
            println!(
                "{} {day}",
                if completed { "completed" } else { "cleared" }
            );
        }
        Command::Move { dragged, target } => {
            let dragged = resolve_id(&store, &dragged)?;
            let target = resolve_id(&store, &target)?;
            if !store.reorder(dragged, target) {
                println!("order unchanged");
            }
        }
        Command::Week { id } => {
            let id = resolve_id(&store, &id)?;
            let habit = store.get(id).ok_or("habit disappeared")?;
            println!("{}", habit.name);
            for cell in week_cells(habit, today) {
                let mark = match cell.status {
                    DayStatus::Completed => "x",
                    DayStatus::Missed => "-",
                    DayStatus::Today => "o",
                    DayStatus::Upcoming => " ",
                };
                println!("  {} [{mark}]", cell.date.format("%a %d"));
            }
        }
    }

    Ok(())
}

fn default_db_path() -> Result<PathBuf, Box<dyn Error>> {
    let dirs = ProjectDirs::from("", "", "habitual").ok_or("no home directory found")?;
    Ok(dirs.data_dir().join(DB_FILE_NAME))
}

fn short_id(id: HabitId) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Accepts a full id or a unique prefix of its simple form.
///
/// Either way the id must belong to a habit in `store`.
fn resolve_id<R: SlotRepository>(
    store: &HabitStore<R>,
    input: &str,
) -> Result<HabitId, Box<dyn Error>> {
    if let Ok(id) = input.parse::<HabitId>() {
        return match store.get(id) {
            Some(_) => Ok(id),
            None => Err(format!("no such habit {id}").into()),
        };
    }
    let prefix = input.trim().to_ascii_lowercase().replace('-', "");
    if prefix.is_empty() {
        return Err("empty habit id".into());
    }
    let mut matches = store
        .habits()
        .iter()
        .filter(|habit| habit.id.simple().to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(habit), None) => Ok(habit.id),
        (None, _) => Err(format!("no habit matches `{input}`").into()),
        (Some(_), Some(_)) => Err(format!("`{input}` matches more than one habit").into()),
    }
}
