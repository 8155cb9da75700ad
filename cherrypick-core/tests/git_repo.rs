//! `GitCli` ref and identity queries against a real on-disk repository.
//!
//! Repositories are built with libgit2 alone so these tests do not depend on
//! a `git` binary being installed.

use cherrypick_core::error::SetupError;
use cherrypick_core::git::GitCli;
use cherrypick_core::vcs::{CommitLister, ConflictInspector, RefLister};
use git2::{Repository, RepositoryInitOptions, Signature};

fn init_repo(dir: &std::path::Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("feature");
    let repo = Repository::init_opts(dir, &opts).unwrap();
    repo.config().unwrap().set_str("user.name", "Ada").unwrap();
    repo
}

fn commit(repo: &Repository, message: &str) -> git2::Oid {
    let sig = Signature::now("Ada", "ada@example.com").unwrap();
    let tree_id = repo.index().unwrap().write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let parents: Vec<git2::Commit> =
        repo.head().ok().and_then(|h| h.peel_to_commit().ok()).into_iter().collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs).unwrap()
}

#[test]
fn discover_outside_a_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = GitCli::discover(dir.path()).err();
    assert!(matches!(err, Some(SetupError::NotARepository { .. })));
}

#[test]
fn reports_branch_identity_and_refs() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());
    let first = commit(&repo, "first");
    repo.branch("staging", &repo.find_commit(first).unwrap(), false).unwrap();
    commit(&repo, "second");

    let git = GitCli::discover(dir.path()).unwrap();
    assert_eq!(git.current_branch().as_deref(), Some("feature"));
    assert_eq!(git.user_name().as_deref(), Some("Ada"));
    assert!(git.ref_exists("staging"));
    assert!(!git.ref_exists("origin/staging"));
    assert!(!git.has_remote("origin"));
    assert_eq!(git.list_branches().unwrap(), vec!["feature", "staging"]);
    assert_eq!(git.replay_in_progress(), None);
}

#[test]
fn ancestors_of_the_target_count_as_applied() {
    let dir = tempfile::tempdir().unwrap();
    let repo = init_repo(dir.path());
    let first = commit(&repo, "first");
    repo.branch("staging", &repo.find_commit(first).unwrap(), false).unwrap();

    let git = GitCli::discover(dir.path()).unwrap();
    assert!(git.is_already_applied(&first.to_string(), "staging"));
}

#[test]
fn unborn_head_has_no_current_branch() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let git = GitCli::discover(dir.path()).unwrap();
    assert_eq!(git.current_branch(), None);
}
