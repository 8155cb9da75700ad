//! Startup checks and commit loading against a collaborator.

use tracing::{debug, info, warn};

use crate::error::{SetupError, VcsError};
use crate::types::{CommitRecord, Scope};
use crate::vcs::{CommitLister, LogQuery, RefLister, ReplayExecutor};

/// What setup learned about the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupContext {
    pub current_branch: String,
    /// The operator's configured name; becomes the initial author filter.
    pub user_name: String,
}

/// Checks the working tree is usable before the UI starts.
///
/// The current branch must exist and must not be in `excluded`, and the
/// operator's identity must be configured.
pub fn validate_setup<R>(vcs: &R, excluded: &[String]) -> Result<SetupContext, SetupError>
where
    R: RefLister + ?Sized,
{
    let current_branch = vcs.current_branch().ok_or(SetupError::NoCurrentBranch)?;
    if excluded.iter().any(|b| *b == current_branch) {
        return Err(SetupError::ExcludedBranch { branch: current_branch });
    }
    let user_name = vcs
        .user_name()
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or(SetupError::NoIdentity)?;
    Ok(SetupContext { current_branch, user_name })
}

/// Fetches `remote` when it exists. Failures are logged and reported back, never fatal.
pub fn fetch_remote<V>(vcs: &V, remote: &str) -> Option<String>
where
    V: RefLister + ReplayExecutor + ?Sized,
{
    if !vcs.has_remote(remote) {
        return Some(format!("No '{remote}' remote configured, working with local branches only"));
    }
    match vcs.fetch(remote) {
        Ok(()) => {
            info!(remote, "fetched");
            None
        }
        Err(e) => {
            warn!(remote, error = %e, "fetch failed");
            Some(format!("Could not fetch from {remote}, working with local branches only"))
        }
    }
}

/// Existing refs for `branch`, remote-tracking first.
pub fn candidate_refs<R>(vcs: &R, remote: &str, branch: &str) -> Vec<String>
where
    R: RefLister + ?Sized,
{
    let remote_ref = format!("{remote}/{branch}");
    [remote_ref, branch.to_owned()]
        .into_iter()
        .filter(|r| vcs.ref_exists(r))
        .collect()
}

/// The first existing ref for `branch`: `<remote>/<branch>`, then `<branch>`.
pub fn resolve_ref<R>(vcs: &R, remote: &str, branch: &str) -> Option<String>
where
    R: RefLister + ?Sized,
{
    candidate_refs(vcs, remote, branch).into_iter().next()
}

/// Lists the commits on HEAD that are not on the source branch, by the scoped author.
///
/// Each commit is checked for being already applied against every existing
/// ref of the target branch. Records come back newest-first.
pub fn load_commits<V>(vcs: &V, scope: &Scope) -> Result<Vec<CommitRecord>, VcsError>
where
    V: CommitLister + RefLister + ?Sized,
{
    let exclude = resolve_ref(vcs, &scope.remote, &scope.source_branch);
    if exclude.is_none() {
        debug!(source = %scope.source_branch, "source branch not found, listing all commits");
    }
    let query = LogQuery {
        include: "HEAD".to_owned(),
        exclude,
        author: Some(scope.author.clone()).filter(|a| !a.is_empty()),
    };
    let raw = vcs.list_commits(&query)?;
    let targets = candidate_refs(vcs, &scope.remote, &scope.target_branch);
    let commits: Vec<CommitRecord> = raw
        .into_iter()
        .map(|r| {
            let applied = targets.iter().any(|t| vcs.is_already_applied(&r.id, t));
            CommitRecord::from_raw(r, applied)
        })
        .collect();
    info!(
        count = commits.len(),
        applied = commits.iter().filter(|c| c.already_applied).count(),
        "commits loaded"
    );
    Ok(commits)
}
