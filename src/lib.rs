//! Todos: a single-user task list persisted in device-local storage.
//!
//! The whole collection lives as one JSON array under the `"todos"` key of
//! a [`KeyValueStorage`] backend. Every store call loads it, changes it and
//! writes it back.
//!
//! # Example
//!
//! ```
//! use todos::{MemoryStorage, SortField, SortOrder, TaskPatch, TaskStore, sort_tasks};
//!
//! let mut store = TaskStore::new(MemoryStorage::new());
//!
//! let milk = store.add_task("Buy milk", None);
//! let rent = store.add_task("Pay rent", None);
//!
//! store.toggle_task(&milk.id).unwrap();
//! store.update_task(&rent.id, TaskPatch::new().title("Pay rent (March)")).unwrap();
//!
//! let tasks = sort_tasks(&store.get_tasks(), SortField::Completed, SortOrder::Asc);
//! assert_eq!(tasks[0].id, rent.id);
//! assert!(tasks[1].completed);
//! ```

mod id;
mod store;
mod types;

pub mod codec;
pub mod config;
pub mod sort;
pub mod storage;

// Re-export public API
pub use config::Config;
pub use sort::{SortField, SortOrder, collate, sort_tasks};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{STORAGE_KEY, StoreError, TaskStore};
pub use types::{DueStatus, MAX_TITLE_CHARS, Task, TaskPatch, ValidationError, validate_title};
