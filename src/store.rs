use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError, ValidationError};
use crate::sink::TaskSink;
use crate::task::{NewTask, Priority, Status, Task, TaskId};

/// Ordered task list mirrored to a [`TaskSink`] after every mutation.
pub struct TaskStore<S> {
    sink: S,
    clock: Box<dyn Clock>,
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl<S: TaskSink> TaskStore<S> {
    /// Opens the store and loads whatever the sink holds. A missing document yields an
    /// empty store; a corrupt one is returned as an error.
    pub fn open(sink: S) -> Result<Self> {
        let mut store = Self::empty(sink);
        store.load()?;
        Ok(store)
    }

    /// Like [`TaskStore::open`], but a document that can't be read starts the store empty.
    pub fn open_or_recover(sink: S) -> Self {
        let mut store = Self::empty(sink);
        if let Err(e) = store.load() {
            warn!("discarding unreadable task list: {e}");
            store.tasks.clear();
            store.next_id = 1;
        }
        store
    }

    fn empty(sink: S) -> Self {
        Self {
            sink,
            clock: Box::new(SystemClock),
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// Replaces the in-memory list with the sink's document. On error the current state
    /// is left untouched.
    pub fn load(&mut self) -> Result<()> {
        let tasks = self.sink.load()?.unwrap_or_default();

        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if task.id == 0 {
                return Err(StoreError::InvalidId {
                    origin: self.sink.origin(),
                    id: task.id,
                });
            }
            if !seen.insert(task.id) {
                return Err(StoreError::DuplicateId {
                    origin: self.sink.origin(),
                    id: task.id,
                });
            }
            if task.description.trim().is_empty() {
                return Err(StoreError::Corrupt {
                    origin: self.sink.origin(),
                    reason: format!("task {} has an empty description", task.id),
                });
            }
        }

        // The top id must leave room for the next allocation.
        let next_id = match tasks.iter().map(|t| t.id).max() {
            None => 1,
            Some(max) => max.checked_add(1).ok_or_else(|| StoreError::InvalidId {
                origin: self.sink.origin(),
                id: max,
            })?,
        };
        self.next_id = next_id;
        self.tasks = tasks;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.sink.save(&self.tasks)
    }

    pub fn add_task(&mut self, new: NewTask) -> Result<Task> {
        let valid = new.validate()?;
        let id = self.next_id;
        // Burn the id even if the save below fails.
        self.next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;

        let task = valid.into_task(id, self.clock.today());
        self.tasks.push(task.clone());
        if let Err(e) = self.save() {
            warn!("failed to persist new task {id}: {e}");
            self.tasks.pop();
            return Err(e);
        }
        debug!("added task {id}");
        Ok(task)
    }

    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn complete_task(&mut self, id: TaskId) -> Result<bool> {
        self.set_completed(id, true)
    }

    pub fn uncomplete_task(&mut self, id: TaskId) -> Result<bool> {
        self.set_completed(id, false)
    }

    fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let previous = std::mem::replace(&mut self.tasks[index].completed, completed);
        if let Err(e) = self.save() {
            warn!("failed to persist task {id}: {e}");
            self.tasks[index].completed = previous;
            return Err(e);
        }
        debug!("task {id} completed={completed}");
        Ok(true)
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let removed = self.tasks.remove(index);
        if let Err(e) = self.save() {
            warn!("failed to persist deletion of task {id}: {e}");
            self.tasks.insert(index, removed);
            return Err(e);
        }
        debug!("deleted task {id}");
        Ok(true)
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Case-insensitive substring match on the description.
    pub fn search_tasks(&self, query: &str) -> Vec<&Task> {
        let query = query.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| t.description.to_lowercase().contains(&query))
            .collect()
    }

    pub fn get_statistics(&self) -> Statistics {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();

        let mut priorities = BTreeMap::new();
        let mut categories = BTreeMap::new();
        for task in &self.tasks {
            *priorities.entry(task.priority).or_insert(0) += 1;
            *categories.entry(task.category.clone()).or_insert(0) += 1;
        }

        let completion_rate = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Statistics {
            total,
            completed,
            pending: total - completed,
            completion_rate,
            priorities,
            categories,
        }
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }
}

/// Conjunction of optional predicates. An unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub category: Option<String>,
}

impl TaskFilter {
    /// Builds a filter from raw strings. Blank values count as absent.
    pub fn parse(
        priority: Option<&str>,
        status: Option<&str>,
        category: Option<&str>,
    ) -> Result<Self, ValidationError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.trim().is_empty())
        }
        Ok(Self {
            priority: present(priority).map(str::parse::<Priority>).transpose()?,
            status: present(status).map(str::parse::<Status>).transpose()?,
            category: present(category).map(|c| c.trim().to_string()),
        })
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.priority.map_or(true, |p| task.priority == p)
            && self.status.map_or(true, |s| s.matches(task))
            && self
                .category
                .as_deref()
                .map_or(true, |c| task.category.eq_ignore_ascii_case(c))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage in `0.0..=100.0`.
    pub completion_rate: f64,
    pub priorities: BTreeMap<Priority, usize>,
    pub categories: BTreeMap<String, usize>,
}
