//! Configuration schema and loading.
//!
//! Values come from, in order of precedence:
//! 1. `$PROJECT_GIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/project-git/config.toml` (via `dirs::config_dir`)
//! 3. Built-in defaults
//!
//! A missing file is not an error; every field has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_ENV: &str = "PROJECT_GIT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("no data directory available; set data_dir in the config file")]
    NoDataDir,
}

/// What to do when a branch's auto-stash cannot be re-applied after checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StashConflictPolicy {
    /// Hard-reset and drop the stash; the switch succeeds with a warning.
    #[default]
    Discard,
    /// Hard-reset but keep the stash; the switch reports `StashApplyConflict`.
    Keep,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_remote: String,
    pub stash_conflict_policy: StashConflictPolicy,
    /// Leading path segments that mark a structured project resource.
    pub resource_prefixes: Vec<String>,
    pub history_page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("project-git"))
            .unwrap_or_else(|| PathBuf::from(".project-git"));

        Self {
            data_dir,
            default_remote: "origin".to_string(),
            stash_conflict_policy: StashConflictPolicy::default(),
            resource_prefixes: vec![
                "ignition".to_string(),
                "com.inductiveautomation.".to_string(),
            ],
            history_page_size: 50,
        }
    }
}

impl Config {
    /// Load the config from an explicit path, the environment, or the user
    /// config directory, falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path(),
        };

        match path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("project-git").join("config.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build a config rooted at the given data directory, other values default.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    /// Working copy of a project.
    pub fn project_path(&self, project: &str) -> PathBuf {
        self.projects_dir().join(project)
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join("records.json")
    }
}
