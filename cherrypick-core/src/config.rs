//! Configuration file (`config.toml`).
//!
//! Lives at `$XDG_CONFIG_HOME/cherrypick/config.toml`, falling back to
//! `~/.config/cherrypick/config.toml`. Every field has a default, so a
//! missing file or a partial one is fine; malformed TOML is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Scope;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub git: GitConfig,
    pub ui: UiConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Branch the selected commits are replayed onto.
    pub target_branch: String,
    /// Commits already on this branch are not listed.
    pub source_branch: String,
    pub remote: String,
    /// Fetch before listing and pull before replaying.
    pub auto_fetch: bool,
    /// Branches the tool refuses to run on.
    pub excluded_branches: Vec<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            target_branch: "clean-staging".to_owned(),
            source_branch: "dev".to_owned(),
            remote: "origin".to_owned(),
            auto_fetch: true,
            excluded_branches: ["dev", "staging", "live", "main", "master"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub cursor_blink_interval_ms: u64,
    pub show_commit_date: bool,
    pub show_commit_author: bool,
    pub max_commit_message_length: usize,
    /// `"dark"` or `"catppuccin-mocha"`.
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            cursor_blink_interval_ms: 500,
            show_commit_date: false,
            show_commit_author: false,
            max_commit_message_length: 80,
            theme: "dark".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub default_reverse: bool,
    pub auto_push: bool,
}

impl Config {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_owned(), source }),
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|source| ConfigError::Write { path: path.to_owned(), source })?;
        }
        std::fs::write(path, text).map_err(|source| ConfigError::Write { path: path.to_owned(), source })
    }

    /// Writes the defaults to `path`, refusing to overwrite an existing file.
    pub fn generate_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists { path: path.to_owned() });
        }
        Self::default().save(path)
    }

    /// The initial scope: configured branches and remote, filtered to `author`.
    pub fn scope(&self, author: &str) -> Scope {
        Scope {
            source_branch: self.git.source_branch.clone(),
            target_branch: self.git.target_branch.clone(),
            author: author.to_owned(),
            remote: self.git.remote.clone(),
        }
    }
}

/// `$XDG_CONFIG_HOME/cherrypick/config.toml`, or under `~/.config` when unset.
pub fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("cherrypick").join("config.toml"))
}
