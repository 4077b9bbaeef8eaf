//! Think Todo: a todo list kept in memory and mirrored to a JSON document after every change.
//!
//! [`store::TaskStore`] is the core. The `tt` binary, the interactive shell and the HTTP
//! API all drive it through the same operations.

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod server;
pub mod shell;
pub mod sink;
pub mod store;
pub mod task;

pub use error::{StoreError, ValidationError};
pub use sink::{JsonFileSink, MemorySink, TaskSink};
pub use store::{Statistics, TaskFilter, TaskStore};
pub use task::{NewTask, Priority, Status, Task, TaskId};
