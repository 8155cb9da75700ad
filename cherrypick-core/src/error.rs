//! Error types shared by the core and the git collaborator.
//!
//! [`VcsError`] is what every collaborator trait method returns. Query failures
//! (diff, stats, candidate listing) are rendered inline by the UI; only setup
//! and post-loop replay failures are fatal, and those travel as [`SetupError`]
//! or get wrapped with `anyhow` context in the binary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by the version-control collaborator.
#[derive(Debug, Error)]
pub enum VcsError {
    /// A ref (branch, remote-tracking branch, commit id) could not be resolved.
    #[error("ref not found: `{name}`")]
    RefNotFound {
        /// The ref as it was requested.
        name: String,
    },

    /// A git invocation exited unsuccessfully.
    #[error("`git {command}` failed: {message}")]
    CommandFailed {
        /// The subcommand and arguments, space-joined, for diagnostics.
        command: String,
        /// Trimmed stderr, or the exit status when stderr was empty.
        message: String,
    },

    /// The git binary could not be spawned, or a file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// libgit2 reported an error while inspecting the repository.
    #[error("repository error: {0}")]
    Repository(#[from] git2::Error),
}

/// Fatal conditions detected before the UI starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("not inside a git working tree: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("not on a valid git branch (detached HEAD or unborn branch)")]
    NoCurrentBranch,

    #[error("refusing to run on `{branch}` directly; it is listed in excluded_branches")]
    ExcludedBranch { branch: String },

    #[error("could not determine your git identity; set `user.name` in git config")]
    NoIdentity,

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Errors from loading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file already exists at {}", path.display())]
    AlreadyExists { path: PathBuf },
}
