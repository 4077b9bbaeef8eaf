use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub type TaskId = u64;

pub const DEFAULT_CATEGORY: &str = "General";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One entry of the todo list. The serialized field names are the on-disk format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub category: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Priority::High => "🔴",
            Priority::Medium => "🟡",
            Priority::Low => "🟢",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ValidationError::InvalidPriority(s.to_string())),
        }
    }
}

/// Completion filter used when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Complete,
    Incomplete,
}

impl Status {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Status::Complete => task.completed,
            Status::Incomplete => !task.completed,
        }
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Ok(Status::Complete),
            "incomplete" => Ok(Status::Incomplete),
            _ => Err(ValidationError::InvalidStatus(s.to_string())),
        }
    }
}

pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDueDate(raw.to_string()))
}

/// Raw, unvalidated input for a new task, as it arrives from the CLI or an HTTP body.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewTask {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Checks every field and fills in defaults, returning a task that only lacks an id
    /// and a creation date.
    pub fn validate(&self) -> Result<ValidTask, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        let priority = match self.priority.as_deref() {
            Some(raw) => raw.parse()?,
            None => Priority::default(),
        };

        let due_date = self.due_date.as_deref().map(parse_due_date).transpose()?;

        let category = match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => DEFAULT_CATEGORY.to_string(),
        };

        Ok(ValidTask {
            description: description.to_string(),
            priority,
            due_date,
            category,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub category: String,
}

impl ValidTask {
    pub fn into_task(self, id: TaskId, created_date: NaiveDate) -> Task {
        Task {
            id,
            description: self.description,
            completed: false,
            priority: self.priority,
            created_date,
            due_date: self.due_date,
            category: self.category,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.completed { "[x]" } else { "[ ]" };
        let due = self
            .due_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "No due date".to_string());
        write!(
            f,
            "{:2} | {} | {} {:6} | {:10} | {}",
            self.id,
            status,
            self.priority.icon(),
            self.priority,
            due,
            self.description
        )
    }
}
