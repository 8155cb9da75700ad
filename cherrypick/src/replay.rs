//! Post-picker replay driver.
//!
//! Runs with the terminal restored, so progress goes to stdout as plain
//! lines. A conflict hands control back to `main`, which re-enters the
//! picker in a conflict session and calls back in here to resume.

use std::io::Write;

use anyhow::{Context, Result};
use cherrypick_core::config::Config;
use cherrypick_core::types::{ReplayOutcome, Scope};
use cherrypick_core::vcs::{RefLister, ReplayExecutor};
use tracing::{info, warn};

/// Where and how a selection is replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySettings {
    pub target_branch: String,
    pub remote: String,
    pub auto_fetch: bool,
    pub auto_push: bool,
}

impl ReplaySettings {
    /// The scope as the operator left it, with the switches from config.
    pub fn new(scope: &Scope, config: &Config) -> Self {
        Self {
            target_branch: scope.target_branch.clone(),
            remote: scope.remote.clone(),
            auto_fetch: config.git.auto_fetch,
            auto_push: config.behavior.auto_push,
        }
    }
}

/// Checks out the target, brings it up to date, and replays `ids` in order.
///
/// A failed pull is reported and the replay goes ahead on the local branch.
pub fn start_replay<V, W>(vcs: &V, settings: &ReplaySettings, ids: &[String], out: &mut W) -> Result<ReplayOutcome>
where
    V: ReplayExecutor + RefLister + ?Sized,
    W: Write,
{
    let target = &settings.target_branch;
    writeln!(out, "Switching to {target}...")?;
    vcs.checkout(target).with_context(|| format!("checking out {target}"))?;

    if settings.auto_fetch && vcs.has_remote(&settings.remote) {
        writeln!(out, "Pulling {target} from {}...", settings.remote)?;
        if let Err(e) = vcs.pull(&settings.remote, target) {
            warn!(remote = %settings.remote, branch = %target, error = %e, "pull failed");
            writeln!(out, "Warning: could not pull {target} from {}: {e}", settings.remote)?;
        }
    }

    replay(vcs, ids, out)
}

/// Replays what was queued behind a settled conflict.
pub fn resume_replay<V, W>(vcs: &V, ids: &[String], out: &mut W) -> Result<ReplayOutcome>
where
    V: ReplayExecutor + ?Sized,
    W: Write,
{
    replay(vcs, ids, out)
}

fn replay<V, W>(vcs: &V, ids: &[String], out: &mut W) -> Result<ReplayOutcome>
where
    V: ReplayExecutor + ?Sized,
    W: Write,
{
    writeln!(out, "Cherry-picking {} commit(s)...", ids.len())?;
    let outcome = vcs.replay_commits(ids).context("cherry-pick failed")?;
    match &outcome {
        ReplayOutcome::Applied => info!(count = ids.len(), "replay applied"),
        ReplayOutcome::ConflictAt { id, remaining } => {
            info!(%id, remaining = remaining.len(), "replay stopped on conflict");
            writeln!(out, "Conflict while cherry-picking {}", short(id))?;
        }
    }
    Ok(outcome)
}

/// Reports a finished replay, pushing when configured to.
pub fn finish<V, W>(vcs: &V, settings: &ReplaySettings, out: &mut W) -> Result<()>
where
    V: ReplayExecutor + ?Sized,
    W: Write,
{
    let target = &settings.target_branch;
    writeln!(out, "Cherry-pick complete.")?;
    if settings.auto_push {
        writeln!(out, "Pushing {target} to {}...", settings.remote)?;
        vcs.push(&settings.remote, target).with_context(|| format!("pushing {target} to {}", settings.remote))?;
        writeln!(out, "Pushed.")?;
    } else {
        writeln!(out, "Remember to push: git push {} {target}", settings.remote)?;
    }
    Ok(())
}

fn short(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
