//! Logging initialization.
//!
//! The TUI owns the terminal, so logs never go to stdout or stderr.
//! Controlled by `CHERRYPICK_LOG`:
//! - unset or empty → no subscriber (tracing macros are no-ops)
//! - a path → plain-text events appended to that file
//!
//! `RUST_LOG` sets the filter; the default is `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber when `CHERRYPICK_LOG` names a file.
pub fn init() -> Result<()> {
    match std::env::var("CHERRYPICK_LOG").ok().as_deref() {
        None | Some("") => Ok(()),
        Some(path) => init_file(Path::new(path)),
    }
}

fn init_file(path: &Path) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_target(true).with_writer(Mutex::new(file)))
        .try_init()
        .context("installing the tracing subscriber")?;
    Ok(())
}
