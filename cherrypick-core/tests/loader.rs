//! Setup validation and commit loading against the scripted collaborator.

use cherrypick_core::error::SetupError;
use cherrypick_core::fake::FakeVcs;
use cherrypick_core::loader::{fetch_remote, load_commits, resolve_ref, validate_setup};
use cherrypick_core::types::Scope;

fn scope() -> Scope {
    Scope {
        source_branch: "dev".into(),
        target_branch: "staging".into(),
        author: "Ada".into(),
        remote: "origin".into(),
    }
}

fn excluded() -> Vec<String> {
    vec!["dev".into(), "main".into()]
}

#[test]
fn setup_reports_branch_and_identity() {
    let ctx = validate_setup(&FakeVcs::new(), &excluded()).unwrap();
    assert_eq!(ctx.current_branch, "feature");
    assert_eq!(ctx.user_name, "Ada");
}

#[test]
fn setup_rejects_detached_head() {
    let mut vcs = FakeVcs::new();
    vcs.current_branch = None;
    assert!(matches!(validate_setup(&vcs, &excluded()), Err(SetupError::NoCurrentBranch)));
}

#[test]
fn setup_rejects_excluded_branch() {
    let mut vcs = FakeVcs::new();
    vcs.current_branch = Some("main".into());
    let err = validate_setup(&vcs, &excluded()).unwrap_err();
    assert!(matches!(err, SetupError::ExcludedBranch { ref branch } if branch == "main"));
}

#[test]
fn setup_rejects_blank_identity() {
    let mut vcs = FakeVcs::new();
    vcs.user_name = Some("  ".into());
    assert!(matches!(validate_setup(&vcs, &excluded()), Err(SetupError::NoIdentity)));
}

#[test]
fn remote_ref_is_preferred_over_local() {
    let vcs = FakeVcs::new().with_ref("dev").with_ref("origin/dev");
    assert_eq!(resolve_ref(&vcs, "origin", "dev").as_deref(), Some("origin/dev"));
    let local_only = FakeVcs::new().with_ref("dev");
    assert_eq!(resolve_ref(&local_only, "origin", "dev").as_deref(), Some("dev"));
    assert_eq!(resolve_ref(&FakeVcs::new(), "origin", "dev"), None);
}

#[test]
fn load_excludes_source_and_filters_author() {
    let vcs = FakeVcs::new().with_ref("origin/dev").with_commit("c1", "one", 2);
    load_commits(&vcs, &scope()).unwrap();
    let query = vcs.last_query.borrow().clone().unwrap();
    assert_eq!(query.include, "HEAD");
    assert_eq!(query.exclude.as_deref(), Some("origin/dev"));
    assert_eq!(query.author.as_deref(), Some("Ada"));
}

#[test]
fn missing_source_lists_everything() {
    let vcs = FakeVcs::new().with_commit("c1", "one", 2);
    load_commits(&vcs, &scope()).unwrap();
    assert_eq!(vcs.last_query.borrow().as_ref().and_then(|q| q.exclude.clone()), None);
}

#[test]
fn applied_is_checked_against_every_target_ref() {
    let vcs = FakeVcs::new()
        .with_ref("origin/staging")
        .with_ref("staging")
        .with_commit("c1", "one", 3)
        .with_commit("c2", "two", 2)
        .with_commit("c3", "three", 1)
        .with_applied("origin/staging", "c1")
        .with_applied("staging", "c3");
    let commits = load_commits(&vcs, &scope()).unwrap();
    let applied: Vec<bool> = commits.iter().map(|c| c.already_applied).collect();
    assert_eq!(applied, vec![true, false, true]);
}

#[test]
fn missing_target_marks_nothing_applied() {
    let vcs = FakeVcs::new().with_commit("c1", "one", 1).with_applied("staging", "c1");
    let commits = load_commits(&vcs, &scope()).unwrap();
    assert!(!commits[0].already_applied);
}

#[test]
fn list_failure_propagates() {
    let mut vcs = FakeVcs::new();
    vcs.fail_list = true;
    assert!(load_commits(&vcs, &scope()).is_err());
}

#[test]
fn fetch_failure_is_a_warning() {
    let mut vcs = FakeVcs::new();
    assert!(fetch_remote(&vcs, "origin").is_some_and(|w| w.contains("No 'origin' remote")));
    vcs.remotes.insert("origin".into());
    assert_eq!(fetch_remote(&vcs, "origin"), None);
    vcs.fail_fetch = true;
    assert!(fetch_remote(&vcs, "origin").is_some());
    assert_eq!(vcs.count("fetch"), 2);
}
