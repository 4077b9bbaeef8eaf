//! Where the task list lives between runs.
//!
//! A sink only ever sees the whole list: `save` replaces the stored document and `load`
//! returns it in full. There is no partial or incremental write.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::debug;

use crate::error::{Result, StoreError};
use crate::task::Task;

pub trait TaskSink {
    /// `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<Vec<Task>>>;

    fn save(&self, tasks: &[Task]) -> Result<()>;

    /// Human-readable name of the backing document, used in error messages.
    fn origin(&self) -> String;
}

pub fn encode(tasks: &[Task]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tasks)
}

pub fn decode(content: &str) -> serde_json::Result<Vec<Task>> {
    serde_json::from_str(content)
}

/// JSON array on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    pub path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tasks.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl TaskSink for JsonFileSink {
    fn load(&self) -> Result<Option<Vec<Task>>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no task file at {}, starting empty", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let tasks = decode(&content).map_err(|e| StoreError::Corrupt {
            origin: self.origin(),
            reason: e.to_string(),
        })?;
        debug!("loaded {} tasks from {}", tasks.len(), self.path.display());
        Ok(Some(tasks))
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }
        let content = encode(tasks).map_err(|e| self.write_err(e.into()))?;

        // Write beside the target and rename over it so a crash never leaves half a document.
        let tmp = self.temp_path();
        fs::write(&tmp, content).map_err(|e| self.write_err(e))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.write_err(e));
        }
        debug!("saved {} tasks to {}", tasks.len(), self.path.display());
        Ok(())
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the encoded document in memory. Goes through the same JSON codec as the file sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    document: Mutex<Option<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.guard().clone()
    }

    pub fn set_document(&self, document: impl Into<String>) {
        *self.guard() = Some(document.into());
    }

    // The guarded value is a plain string, so a poisoned lock still holds usable data.
    fn guard(&self) -> MutexGuard<'_, Option<String>> {
        self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn encode_err(&self, e: serde_json::Error) -> StoreError {
        StoreError::Write {
            path: PathBuf::from(self.origin()),
            source: e.into(),
        }
    }
}

impl TaskSink for MemorySink {
    fn load(&self) -> Result<Option<Vec<Task>>> {
        match self.document() {
            None => Ok(None),
            Some(content) => decode(&content).map(Some).map_err(|e| StoreError::Corrupt {
                origin: self.origin(),
                reason: e.to_string(),
            }),
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let content = encode(tasks).map_err(|e| self.encode_err(e))?;
        self.set_document(content);
        Ok(())
    }

    fn origin(&self) -> String {
        "<memory>".to_string()
    }
}
