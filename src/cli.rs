//! CLI argument parsing for `td`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use todos::{SortField, SortOrder};

#[derive(Parser)]
#[command(
    name = "td",
    about = "A small personal task list",
    version,
    after_help = "Logs are written to: ~/.local/share/todos/logs/todos.log"
)]
pub struct Cli {
    /// Directory holding the .todos store (default: config `dir`, else current directory)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the .todos directory
    Init,

    /// Add a task
    Add {
        /// Task title (1-100 characters)
        title: String,

        /// Due date: RFC 3339, YYYY-MM-DDTHH:MM or YYYY-MM-DD (local time)
        #[arg(long, value_parser = parse_datetime)]
        due: Option<DateTime<Utc>>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Sort field (due-date, created-at, title, completed)
        #[arg(short, long)]
        sort: Option<SortField>,

        /// Sort order (asc, desc)
        #[arg(short, long)]
        order: Option<SortOrder>,

        /// Reverse the resulting order
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show one task
    Show {
        /// Task ID
        id: String,
    },

    /// Change a task's title or due date
    Edit {
        /// Task ID
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New due date
        #[arg(long, value_parser = parse_datetime, conflicts_with = "clear_due")]
        due: Option<DateTime<Utc>>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Flip a task between open and completed
    #[command(alias = "done")]
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task
    #[command(alias = "delete")]
    Rm {
        /// Task ID
        id: String,
    },
}

/// Parse a due date given on the command line.
///
/// Date-only input means the end of that day in local time.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(23, 59, 0))
        })
        .ok_or_else(|| format!("invalid date '{}': expected YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339", s))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", s))
}
