use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{DATA_FILE_ENV, DEFAULT_DATA_FILE};
use crate::sink::TaskSink;
use crate::store::{Statistics, TaskFilter, TaskStore};
use crate::task::{NewTask, Task, TaskId};

#[derive(Parser)]
#[command(name = "tt")]
#[command(about = "Think Todo (tt) - todo list manager with JSON persistence")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// JSON file holding the task list
    #[arg(long, global = true, env = DATA_FILE_ENV, default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,
    #[arg(long, global = true)]
    pub debug: bool,
    /// Start with an empty list if the data file is unreadable
    #[arg(long, global = true)]
    pub recover: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Task(TaskCommand),
    /// Interactive prompt
    Shell,
    /// Serve the task list as a JSON API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

/// Operations on the task list, shared by one-shot mode and the shell.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum TaskCommand {
    /// Add a new task
    Add {
        #[arg(required = true)]
        description: Vec<String>,
        /// High, Medium or Low
        #[arg(short, long)]
        priority: Option<String>,
        /// YYYY-MM-DD
        #[arg(short, long)]
        due_date: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List tasks, optionally filtered
    List {
        #[arg(long)]
        priority: Option<String>,
        /// complete or incomplete
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Mark a task as complete
    Complete { id: TaskId },
    /// Mark a task as incomplete
    Uncomplete { id: TaskId },
    /// Delete a task
    Delete { id: TaskId },
    /// Search task descriptions
    Search {
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show statistics
    Stats,
}

pub fn execute<S: TaskSink>(
    store: &mut TaskStore<S>,
    command: TaskCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        TaskCommand::Add {
            description,
            priority,
            due_date,
            category,
        } => {
            let task = store.add_task(NewTask {
                description: description.join(" "),
                priority,
                due_date,
                category,
            })?;
            writeln!(out, "Task added successfully! ID: {}", task.id)?;
        }
        TaskCommand::List {
            priority,
            status,
            category,
        } => {
            let filter =
                TaskFilter::parse(priority.as_deref(), status.as_deref(), category.as_deref())?;
            let tasks = store.list_tasks(&filter);
            if tasks.is_empty() {
                writeln!(out, "No tasks found.")?;
            } else {
                writeln!(out)?;
                write_table(out, &tasks)?;
            }
        }
        TaskCommand::Complete { id } => {
            if store.complete_task(id)? {
                writeln!(out, "Task marked as complete!")?;
            } else {
                not_found(out, id)?;
            }
        }
        TaskCommand::Uncomplete { id } => {
            if store.uncomplete_task(id)? {
                writeln!(out, "Task marked as incomplete!")?;
            } else {
                not_found(out, id)?;
            }
        }
        TaskCommand::Delete { id } => {
            if store.delete_task(id)? {
                writeln!(out, "Task deleted successfully!")?;
            } else {
                not_found(out, id)?;
            }
        }
        TaskCommand::Search { query } => {
            let query = query.join(" ");
            let tasks = store.search_tasks(&query);
            if tasks.is_empty() {
                writeln!(out, "No tasks found matching '{}'", query)?;
            } else {
                writeln!(out, "\nSearch results for '{}':", query)?;
                write_table(out, &tasks)?;
            }
        }
        TaskCommand::Stats => write_stats(out, &store.get_statistics())?,
    }
    Ok(())
}

fn not_found(out: &mut impl Write, id: TaskId) -> std::io::Result<()> {
    writeln!(out, "Error: Task with ID {} not found", id)
}

fn write_table(out: &mut impl Write, tasks: &[&Task]) -> std::io::Result<()> {
    writeln!(
        out,
        "{:2} | {:6} | {:8} | {:10} | Description",
        "ID", "Status", "Priority", "Due Date"
    )?;
    writeln!(out, "{}", "-".repeat(80))?;
    for task in tasks {
        writeln!(out, "{}", task)?;
    }
    Ok(())
}

fn write_stats(out: &mut impl Write, stats: &Statistics) -> std::io::Result<()> {
    writeln!(out, "\n=== Task Statistics ===")?;
    writeln!(out, "Total tasks: {}", stats.total)?;
    writeln!(
        out,
        "Completed: {} ({:.1}%)",
        stats.completed, stats.completion_rate
    )?;
    writeln!(out, "Pending: {}", stats.pending)?;

    if !stats.priorities.is_empty() {
        writeln!(out, "\nBy Priority:")?;
        for (priority, count) in &stats.priorities {
            writeln!(out, "  {}: {}", priority, count)?;
        }
    }
    if !stats.categories.is_empty() {
        writeln!(out, "\nBy Category:")?;
        for (category, count) in &stats.categories {
            writeln!(out, "  {}: {}", category, count)?;
        }
    }
    Ok(())
}
