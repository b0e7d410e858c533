//! Schedule management commands for CLI.

use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;
use examtimer_core::{current_time_of_day, Config, ExamWindow};

use super::open_store;

#[derive(Subcommand)]
pub enum ExamAction {
    /// Add an exam window (HH:MM, 24-hour)
    Add {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Subject name
        #[arg(long, default_value = "")]
        name: String,
        /// Free-text note
        #[arg(long, default_value = "")]
        info: String,
    },
    /// List today's exams
    List {
        #[arg(long)]
        json: bool,
    },
    /// Remove an exam by id
    Remove { id: String },
    /// Remove every exam
    Clear {
        /// Confirm clearing the schedule
        #[arg(long)]
        yes: bool,
    },
    /// Export the schedule as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the schedule with the rows of a CSV file
    Import { file: PathBuf },
}

pub fn run(action: ExamAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut store = open_store(&config)?;

    match action {
        ExamAction::Add {
            start,
            end,
            name,
            info,
        } => {
            let window = store.add(&start, &end, &name, &info)?;
            println!("{}", serde_json::to_string_pretty(&window)?);
        }
        ExamAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.list())?);
            } else if store.is_empty() {
                println!("No exams scheduled.");
            } else {
                let now = current_time_of_day(Local::now().naive_local());
                for window in store.list() {
                    println!("{}", render_row(window, &now));
                }
            }
        }
        ExamAction::Remove { id } => {
            if store.remove(&id)? {
                println!("Exam removed: {id}");
            } else {
                println!("No exam with id {id}");
            }
        }
        ExamAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear the schedule without --yes".into());
            }
            store.clear()?;
            println!("Schedule cleared.");
        }
        ExamAction::Export { output } => {
            let csv = store.export_csv();
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    println!("Exported {} exams to {}", store.len(), path.display());
                }
                None => println!("{csv}"),
            }
        }
        ExamAction::Import { file } => {
            let text = std::fs::read_to_string(&file)?;
            let result = store.import_csv(&text)?;
            if result.imported == 0 {
                println!(
                    "No usable rows in {} ({} skipped); schedule unchanged.",
                    file.display(),
                    result.skipped
                );
            } else {
                println!(
                    "Imported {} items ({} skipped).",
                    result.imported, result.skipped
                );
            }
        }
    }
    Ok(())
}

/// One table row. `*` marks the running exam, `-` finished ones.
fn render_row(window: &ExamWindow, now: &str) -> String {
    let marker = if now >= window.start.as_str() && now < window.end.as_str() {
        '*'
    } else if now >= window.end.as_str() {
        '-'
    } else {
        ' '
    };
    let mut row = format!(
        "{marker} {}-{}  {}  [{}]",
        window.start, window.end, window.name, window.id
    );
    if !window.info.is_empty() {
        row.push_str(&format!("  {}", window.info));
    }
    row
}
