//! User configuration for the `td` front end.

use crate::sort::{SortField, SortOrder};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TODOS_CONFIG";

/// Config file name within the platform config directory.
const CONFIG_FILE: &str = "config.yaml";

/// Settings read from `config.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store root used when `--dir` is not given
    pub dir: Option<PathBuf>,

    /// Default sort field for `td list`
    pub sort: SortField,

    /// Default sort order; falls back to the field's own default
    pub order: Option<SortOrder>,
}

impl Config {
    /// Location of the config file: `$TODOS_CONFIG`, else `<config_dir>/todos/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("todos").join(CONFIG_FILE))
    }

    /// Load from the default location, or defaults if there is no file.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse YAML text. Empty text yields defaults.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("Failed to parse config")
    }

    /// Field and order for a listing, given command-line overrides.
    ///
    /// An explicit order wins. Otherwise a configured order applies, then the
    /// field's own default. `reverse` flips whatever was chosen.
    pub fn resolve_sort(
        &self,
        field: Option<SortField>,
        order: Option<SortOrder>,
        reverse: bool,
    ) -> (SortField, SortOrder) {
        let field = field.unwrap_or(self.sort);
        let order = order.or(self.order).unwrap_or_else(|| field.default_order());
        if reverse { (field, order.reversed()) } else { (field, order) }
    }
}
