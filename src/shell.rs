use std::io::{BufRead, Write};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cli::{execute, TaskCommand};
use crate::sink::TaskSink;
use crate::store::TaskStore;

#[derive(Parser)]
#[command(name = "todo", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Task(TaskCommand),
    /// Exit the shell
    #[command(alias = "exit")]
    Quit,
}

/// Prompt loop. Ends on `quit`, `exit` or end of input; a bad line is reported and skipped.
pub fn run<S: TaskSink>(
    store: &mut TaskStore<S>,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<()> {
    writeln!(out, "=== Todo List Application ===")?;
    writeln!(out, "Type 'help' for available commands, 'quit' to exit.")?;

    let mut line = String::new();
    loop {
        write!(out, "\n> ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out, "\nGoodbye!")?;
            return Ok(());
        }

        let mut words: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let Some(action) = words.first_mut() else {
            continue;
        };
        *action = action.to_lowercase();

        match ShellLine::try_parse_from(&words) {
            Ok(ShellLine {
                command: ShellCommand::Quit,
            }) => {
                writeln!(out, "Goodbye!")?;
                return Ok(());
            }
            Ok(ShellLine {
                command: ShellCommand::Task(command),
            }) => {
                if let Err(e) = execute(store, command, &mut out) {
                    writeln!(out, "Error: {e:#}")?;
                }
            }
            // Covers `help` as well as parse errors.
            Err(e) => {
                write!(out, "{}", e.render())?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use std::io::Cursor;

    fn session(script: &str) -> (TaskStore<MemorySink>, String) {
        let mut store = TaskStore::open(MemorySink::new()).unwrap();
        let mut out = Vec::new();
        run(&mut store, Cursor::new(script.to_string()), &mut out).unwrap();
        (store, String::from_utf8(out).unwrap())
    }

    #[test]
    fn quit_ends_the_session() {
        let (store, out) = session("add Buy groceries -p High\n\nquit\nadd never reached\n");
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].description, "Buy groceries");
        assert!(out.contains("Task added successfully! ID: 1"));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[test]
    fn eof_ends_the_session() {
        let (_, out) = session("list\n");
        assert!(out.contains("No tasks found."));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[test]
    fn commands_are_case_insensitive_and_exit_is_an_alias() {
        let (store, _) = session("ADD first\nComplete 1\nexit\n");
        assert!(store.get_task(1).unwrap().completed);
    }

    #[test]
    fn errors_do_not_stop_the_loop() {
        let (store, out) =
            session("frobnicate\nadd x -d 2023-99-01\ncomplete nine\ncomplete 9\nadd y\nquit\n");
        assert!(out.contains("error:"));
        assert!(out.contains("Error: due date must be in YYYY-MM-DD format"));
        assert!(out.contains("Error: Task with ID 9 not found"));
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].id, 1);
    }

    #[test]
    fn help_lists_commands() {
        let (_, out) = session("help\nquit\n");
        for name in ["add", "list", "complete", "uncomplete", "delete", "search", "stats", "quit"] {
            assert!(out.contains(name), "help is missing {name}");
        }
    }
}
