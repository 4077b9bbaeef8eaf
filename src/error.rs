use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskId;

/// Rejected raw input, caught before anything reaches the task list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task description must not be empty")]
    EmptyDescription,

    #[error("priority must be High, Medium, or Low (got '{0}')")]
    InvalidPriority(String),

    #[error("due date must be in YYYY-MM-DD format (got '{0}')")]
    InvalidDueDate(String),

    #[error("status must be complete or incomplete (got '{0}')")]
    InvalidStatus(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("task document {origin} is corrupt: {reason}")]
    Corrupt { origin: String, reason: String },

    #[error("task document {origin} contains duplicate id {id}")]
    DuplicateId { origin: String, id: TaskId },

    #[error("task document {origin} contains invalid id {id}")]
    InvalidId { origin: String, id: TaskId },

    #[error("no task ids left to allocate")]
    IdsExhausted,
}

impl StoreError {
    /// True when the backing document exists but could not be trusted.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            StoreError::Corrupt { .. } | StoreError::DuplicateId { .. } | StoreError::InvalidId { .. }
        )
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
