//! Shared test infrastructure for todos integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use todos::{FileStorage, StoreError, Task, TaskStore};

/// Test environment backed by a temporary directory.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub store: TaskStore<FileStorage>,
}

impl TestEnv {
    /// Create a new test environment with an initialized store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = TaskStore::init(temp_dir.path()).expect("Failed to init store");
        Self { temp_dir, store }
    }

    /// A second store over the same directory, as a new session would see it.
    pub fn reopen(&self) -> TaskStore<FileStorage> {
        TaskStore::open(self.temp_dir.path()).expect("Failed to reopen store")
    }

    /// Add a task without a due date.
    pub fn add(&mut self, title: &str) -> Task {
        self.store.add_task(title, None)
    }

    /// Add a task with a due date.
    pub fn add_due(&mut self, title: &str, due: DateTime<Utc>) -> Task {
        self.store.add_task(title, Some(due))
    }

    /// Path of the file holding the collection.
    pub fn data_path(&self) -> PathBuf {
        self.store
            .storage()
            .path_for(todos::STORAGE_KEY)
            .expect("Failed to resolve data path")
    }

    /// Raw stored text, if any.
    pub fn raw(&self) -> Option<String> {
        fs::read_to_string(self.data_path()).ok()
    }

    /// Overwrite the stored text directly.
    pub fn write_raw(&self, contents: &str) {
        fs::write(self.data_path(), contents).expect("Failed to write data file");
    }

    /// Number of stored tasks.
    pub fn count(&self) -> usize {
        self.store.get_tasks().len()
    }

    /// Titles in storage order.
    pub fn titles(&self) -> Vec<String> {
        self.store.get_tasks().into_iter().map(|t| t.title).collect()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert that an error is a not-found for `id`.
pub fn assert_not_found(err: &eyre::Report, id: &str) {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::TaskNotFound(missing)) => assert_eq!(missing, id),
        None => panic!("expected TaskNotFound({}), got: {:#}", id, err),
    }
}
