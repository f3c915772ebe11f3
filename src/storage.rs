//! Storage layer: a string-only key/value port and its backends.

use eyre::{Context, Result};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Storage directory name.
pub const TODOS_DIR: &str = ".todos";

/// File extension for stored values.
const VALUE_EXT: &str = "json";

/// Durable string storage keyed by name.
///
/// Values are opaque text; encoding is the caller's business.
pub trait KeyValueStorage {
    /// Read the value under `key`, or `None` if nothing was ever stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Failures recovered inside the store rather than returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The backend could not be read.
    ReadFailure { key: String, reason: String },
    /// A value exists but does not decode.
    ReadCorrupt { key: String, reason: String },
    /// The value could not be written.
    WriteFailure { key: String, reason: String },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::ReadFailure { key, reason } => {
                write!(f, "failed to read '{}': {}", key, reason)
            }
            StorageError::ReadCorrupt { key, reason } => {
                write!(f, "stored value for '{}' is corrupt: {}", key, reason)
            }
            StorageError::WriteFailure { key, reason } => {
                write!(f, "failed to write '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// In-process storage, lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one value.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.values.insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key under `<root>/.todos/`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Initialize storage in the given directory, creating `.todos/`.
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(TODOS_DIR);
        fs::create_dir_all(&dir).context("Failed to create .todos directory")?;
        Ok(Self { dir })
    }

    /// Open existing storage.
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(TODOS_DIR);
        if !dir.is_dir() {
            eyre::bail!("No .todos directory found in {}. Run 'td init' first.", root.display());
        }
        Ok(Self { dir })
    }

    /// Storage rooted at `root`. The directory is created on first write.
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(TODOS_DIR),
        }
    }

    /// Directory holding the value files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            eyre::bail!("Invalid storage key '{}': must be alphanumeric with hyphens/underscores", key);
        }
        Ok(self.dir.join(format!("{}.{}", key, VALUE_EXT)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).context("Failed to create .todos directory")?;

        // Write beside the target and rename over it so readers never see a partial file
        let tmp_path = path.with_extension(format!("{}.tmp", VALUE_EXT));
        let mut file = File::create(&tmp_path).with_context(|| format!("Failed to create {}", tmp_path.display()))?;
        file.write_all(value.as_bytes())
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}
