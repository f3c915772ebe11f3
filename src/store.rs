//! High-level store API for the task list.
//!
//! Every operation loads the whole collection, changes it in memory and
//! writes the whole collection back. Storage trouble never reaches the
//! caller: unreadable content loads as an empty list, and a failed write
//! still returns the intended result. The last such failure is kept for
//! front ends that want to warn about it.

use crate::codec::{decode_tasks, encode_tasks, normalize};
use crate::id::generate_id;
use crate::storage::{FileStorage, KeyValueStorage, StorageError};
use crate::types::{Task, TaskPatch};
use chrono::{DateTime, Utc};
use eyre::Result;
use log::{debug, error, warn};
use std::cell::Cell;
use std::path::Path;

/// Storage key holding the serialized collection.
pub const STORAGE_KEY: &str = "todos";

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No task has this ID.
    TaskNotFound(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TaskNotFound(id) => write!(f, "task not found: {}", id),
        }
    }
}

impl std::error::Error for StoreError {}

/// The task store, generic over its storage backend.
pub struct TaskStore<S: KeyValueStorage> {
    storage: S,
    storage_error: Cell<Option<StorageError>>,
}

impl TaskStore<FileStorage> {
    /// Initialize a file-backed store under `root/.todos`.
    pub fn init(root: &Path) -> Result<Self> {
        let storage = FileStorage::init(root)?;
        Ok(Self::new(storage))
    }

    /// Open an existing file-backed store.
    pub fn open(root: &Path) -> Result<Self> {
        let storage = FileStorage::open(root)?;
        Ok(Self::new(storage))
    }
}

impl<S: KeyValueStorage> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            storage_error: Cell::new(None),
        }
    }

    /// Borrow the backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Take the most recent recovered storage failure, if any.
    pub fn take_storage_error(&self) -> Option<StorageError> {
        self.storage_error.take()
    }

    /// Create a new task and append it to the collection.
    pub fn add_task(&mut self, title: &str, due_date: Option<DateTime<Utc>>) -> Task {
        let mut tasks = self.load();

        let task = Task {
            id: generate_id(),
            title: title.trim().to_string(),
            completed: false,
            created_at: normalize(Utc::now()),
            due_date: due_date.map(normalize),
            extra: serde_json::Map::new(),
        };

        tasks.push(task.clone());
        self.persist(&tasks);

        debug!("Added task {}", task.id);
        task
    }

    /// All tasks in storage order.
    pub fn get_tasks(&self) -> Vec<Task> {
        self.load()
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.load().into_iter().find(|t| t.id == id)
    }

    /// Apply a partial update. `id` and `created_at` in the patch are ignored.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let mut tasks = self.load();

        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| eyre::eyre!(StoreError::TaskNotFound(id.to_string())))?;

        let TaskPatch {
            id: patch_id,
            title,
            completed,
            created_at,
            due_date,
        } = patch;

        if patch_id.is_some() || created_at.is_some() {
            debug!("Dropping immutable fields from update of {}", id);
        }

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(completed) = completed {
            task.completed = completed;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date.map(normalize);
        }

        let updated = task.clone();
        self.persist(&tasks);

        Ok(updated)
    }

    /// Remove a task.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let tasks = self.load();
        let before = tasks.len();
        let remaining: Vec<Task> = tasks.into_iter().filter(|t| t.id != id).collect();

        if remaining.len() == before {
            return Err(eyre::eyre!(StoreError::TaskNotFound(id.to_string())));
        }

        self.persist(&remaining);

        debug!("Deleted task {}", id);
        Ok(())
    }

    /// Flip a task's completed flag.
    pub fn toggle_task(&mut self, id: &str) -> Result<Task> {
        let task = self
            .load()
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| eyre::eyre!(StoreError::TaskNotFound(id.to_string())))?;

        self.update_task(id, TaskPatch::new().completed(!task.completed))
    }

    /// Read the collection; any failure reads as empty.
    fn load(&self) -> Vec<Task> {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => {
                debug!("No stored tasks under '{}'", STORAGE_KEY);
                return Vec::new();
            }
            Err(e) => {
                self.record(StorageError::ReadFailure {
                    key: STORAGE_KEY.to_string(),
                    reason: format!("{:#}", e),
                });
                return Vec::new();
            }
        };

        match decode_tasks(&raw) {
            Ok(tasks) => {
                debug!("Loaded {} task(s)", tasks.len());
                tasks
            }
            Err(e) => {
                self.record(StorageError::ReadCorrupt {
                    key: STORAGE_KEY.to_string(),
                    reason: format!("{:#}", e),
                });
                Vec::new()
            }
        }
    }

    /// Write the collection; failures are logged and recorded, not returned.
    fn persist(&mut self, tasks: &[Task]) {
        let result = encode_tasks(tasks).and_then(|json| self.storage.set(STORAGE_KEY, &json));

        match result {
            Ok(()) => debug!("Persisted {} task(s)", tasks.len()),
            Err(e) => self.record(StorageError::WriteFailure {
                key: STORAGE_KEY.to_string(),
                reason: format!("{:#}", e),
            }),
        }
    }

    fn record(&self, err: StorageError) {
        match &err {
            StorageError::ReadCorrupt { .. } => warn!("{}; treating as empty", err),
            _ => error!("{}", err),
        }
        self.storage_error.set(Some(err));
    }
}
