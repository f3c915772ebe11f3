//! `td` - command-line front end for the todos task list.

use chrono::{DateTime, Local, Utc};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use todos::{
    Config, DueStatus, FileStorage, KeyValueStorage, Task, TaskPatch, TaskStore, sort_tasks, validate_title,
};

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todos")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("todos.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_store_dir(cli: &Cli, config: &Config) -> PathBuf {
    cli.dir.clone().or_else(|| config.dir.clone()).unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    })
}

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn format_due(task: &Task, now: DateTime<Utc>) -> ColoredString {
    let Some(due) = &task.due_date else {
        return "".normal();
    };
    let text = format!("due {}", format_time(due));
    if task.completed {
        return text.dimmed();
    }
    match task.due_status(now) {
        Some(DueStatus::Overdue) => format!("{} (overdue)", text).red(),
        Some(DueStatus::DueSoon) => text.yellow(),
        _ => text.normal(),
    }
}

fn format_task(task: &Task, now: DateTime<Utc>) -> String {
    let mark = if task.completed { "[x]".green() } else { "[ ]".normal() };
    let title = if task.completed {
        task.title.dimmed().strikethrough()
    } else {
        task.title.normal()
    };
    format!("{} {} {} {}", mark, task.id.cyan(), title, format_due(task, now))
        .trim_end()
        .to_string()
}

/// Tell the user when the last write did not stick or stored data was unreadable.
fn report_storage_error<S: KeyValueStorage>(store: &TaskStore<S>) {
    if let Some(err) = store.take_storage_error() {
        eprintln!("{} {}", "Warning:".yellow().bold(), err);
    }
}

fn checked_title(raw: &str) -> Result<String> {
    validate_title(raw).map_err(|e| eyre::eyre!(e))
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let store_dir = get_store_dir(&cli, &config);
    let now = Utc::now();

    match cli.command {
        Command::Init => {
            let storage = FileStorage::init(&store_dir).context("Failed to initialize todos store")?;
            println!("{} Initialized todos store in {}", "✓".green(), storage.dir().display());
        }

        Command::Add { title, due } => {
            let title = checked_title(&title)?;
            if let Some(due) = due
                && due < now
            {
                eprintln!("{} due date {} is in the past", "Warning:".yellow().bold(), format_time(&due));
            }

            let mut store = TaskStore::open(&store_dir).context("Failed to open store")?;
            let task = store.add_task(&title, due);
            report_storage_error(&store);

            println!("{} Added: {} {}", "✓".green(), task.id.cyan(), task.title);
        }

        Command::List { sort, order, reverse } => {
            let store = TaskStore::open(&store_dir).context("Failed to open store")?;
            let (field, order) = config.resolve_sort(sort, order, reverse);

            let tasks = sort_tasks(&store.get_tasks(), field, order);
            report_storage_error(&store);

            if tasks.is_empty() {
                println!("{}", "No tasks".dimmed());
            } else {
                let done = tasks.iter().filter(|t| t.completed).count();
                println!(
                    "{} task(s), {} done {}",
                    tasks.len(),
                    done,
                    format!("(sorted by {} {})", field, order).dimmed()
                );
                for task in &tasks {
                    println!("{}", format_task(task, now));
                }
            }
        }

        Command::Show { id } => {
            let store = TaskStore::open(&store_dir).context("Failed to open store")?;
            let task = store.get_task(&id);
            report_storage_error(&store);

            match task {
                Some(task) => {
                    println!("{}: {}", "ID".bold(), task.id.cyan());
                    println!("{}: {}", "Title".bold(), task.title);
                    let status = if task.completed { "completed".green() } else { "open".normal() };
                    println!("{}: {}", "Status".bold(), status);
                    println!("{}: {}", "Created".bold(), format_time(&task.created_at));
                    if task.due_date.is_some() {
                        println!("{}: {}", "Due".bold(), format_due(&task, now));
                    }
                }
                None => {
                    eprintln!("{} Task not found: {}", "✗".red(), id);
                    std::process::exit(1);
                }
            }
        }

        Command::Edit {
            id,
            title,
            due,
            clear_due,
        } => {
            let mut patch = TaskPatch::new();
            if let Some(title) = title {
                patch = patch.title(checked_title(&title)?);
            }
            if let Some(due) = due {
                patch = patch.due_date(due);
            } else if clear_due {
                patch = patch.clear_due_date();
            }
            if patch.is_empty() {
                eyre::bail!("Nothing to change: pass --title, --due or --clear-due");
            }

            let mut store = TaskStore::open(&store_dir).context("Failed to open store")?;
            let task = store.update_task(&id, patch).context("Failed to update task")?;
            report_storage_error(&store);

            println!("{} Updated: {}", "✓".green(), format_task(&task, now));
        }

        Command::Toggle { id } => {
            let mut store = TaskStore::open(&store_dir).context("Failed to open store")?;
            let task = store.toggle_task(&id).context("Failed to toggle task")?;
            report_storage_error(&store);

            if task.completed {
                println!("{} Completed: {} {}", "✓".green(), task.id.cyan(), task.title);
            } else {
                println!("{} Reopened: {} {}", "→".blue(), task.id.cyan(), task.title);
            }
        }

        Command::Rm { id } => {
            let mut store = TaskStore::open(&store_dir).context("Failed to open store")?;
            store.delete_task(&id).context("Failed to delete task")?;
            report_storage_error(&store);

            println!("{} Deleted: {}", "✓".green(), id.cyan());
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    let config = Config::load().context("Failed to load config")?;

    if let Err(e) = run(cli, config) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
