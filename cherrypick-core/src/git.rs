//! The production collaborator: the `git` command line plus libgit2.
//!
//! Text-producing operations (log, show, status, cherry-pick) shell out to
//! `git` and parse its output; cheap repository queries (refs, identity,
//! ancestry, repository state) go through `git2` directly. Every subprocess
//! runs non-interactively except the ones that hand over the terminal.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use git2::{BranchType, Oid, Repository, RepositoryState};
use tracing::{debug, warn};

use crate::error::{SetupError, VcsError};
use crate::types::{ConflictedFile, EditorOption, RawCommit, ReplayOutcome};
use crate::vcs::{CommitLister, ConflictInspector, DiffSource, LogQuery, RefLister, ReplayExecutor};

const RECORD_SEP: char = '\x1e';
const FIELD_SEP: char = '\x1f';
const LOG_FORMAT: &str = "--format=%x1e%H%x1f%h%x1f%at%x1f%ad%x1f%an%x1f%P%x1f%s%x1f%B%x1f";

/// Editors offered for conflict resolution, in menu order: (command, label, runs in terminal).
const KNOWN_EDITORS: &[(&str, &str, bool)] = &[
    ("code", "VS Code", false),
    ("subl", "Sublime Text", false),
    ("nvim", "Neovim", true),
    ("vim", "Vim", true),
    ("nano", "Nano", true),
    ("emacs", "Emacs", true),
];

pub struct GitCli {
    repo: Repository,
    workdir: PathBuf,
    // target ref -> ids on HEAD whose patch already exists there
    equivalents: RefCell<HashMap<String, HashSet<String>>>,
}

impl GitCli {
    /// Opens the repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let not_a_repo = || SetupError::NotARepository { path: path.to_path_buf() };
        let repo = Repository::discover(path).map_err(|_| not_a_repo())?;
        let workdir = repo.workdir().ok_or_else(not_a_repo)?.to_path_buf();
        debug!(workdir = %workdir.display(), "repository opened");
        Ok(Self { repo, workdir, equivalents: RefCell::new(HashMap::new()) })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Runs `git` with prompts, pagers and editors disabled; returns stdout.
    fn run(&self, args: &[&str]) -> Result<String, VcsError> {
        let command = args.join(" ");
        debug!(%command, "git");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.workdir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_PAGER", "cat")
            .env("PAGER", "cat")
            .env("GIT_EDITOR", ":")
            .env("GIT_SEQUENCE_EDITOR", ":")
            .env("GIT_MERGE_AUTOEDIT", "no")
            .stdin(Stdio::null())
            .output()?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        let message = if stderr.is_empty() { output.status.to_string() } else { stderr };
        warn!(%command, %message, "git failed");
        Err(VcsError::CommandFailed { command, message })
    }

    /// Runs a program attached to the terminal and waits for it.
    fn run_attached(&self, program: &str, args: &[&str]) -> Result<(), VcsError> {
        let command = format!("{program} {}", args.join(" "));
        debug!(%command, "attached");
        let status = Command::new(program).current_dir(&self.workdir).args(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(VcsError::CommandFailed { command, message: status.to_string() })
        }
    }

    /// Opens `paths` in `option`, or runs `git mergetool`. Takes over the terminal.
    pub fn launch_editor(&self, option: &EditorOption, paths: &[String]) -> Result<(), VcsError> {
        if option.is_mergetool() {
            return self.run_attached("git", &["mergetool"]);
        }
        let mut args: Vec<&str> = match option.command.as_str() {
            "code" => vec!["--wait"],
            "subl" => vec!["-w"],
            _ => Vec::new(),
        };
        args.extend(paths.iter().map(String::as_str));
        self.run_attached(&option.command, &args)
    }

    fn resolve_commit(&self, rev: &str) -> Result<Oid, VcsError> {
        let obj = self
            .repo
            .revparse_single(rev)
            .map_err(|_| VcsError::RefNotFound { name: rev.to_owned() })?;
        Ok(obj.peel_to_commit()?.id())
    }

    fn is_ancestor(&self, id: &str, target: &str) -> Result<bool, VcsError> {
        let commit = self.resolve_commit(id)?;
        let tip = self.resolve_commit(target)?;
        Ok(commit == tip || self.repo.graph_descendant_of(tip, commit)?)
    }

    /// Ids on HEAD that `git cherry` reports as already present on `target`.
    fn equivalent_ids(&self, target: &str) -> HashSet<String> {
        if let Some(hit) = self.equivalents.borrow().get(target) {
            return hit.clone();
        }
        let ids = match self.run(&["cherry", target, "HEAD"]) {
            Ok(out) => parse_cherry(&out),
            Err(_) => HashSet::new(),
        };
        self.equivalents.borrow_mut().insert(target.to_owned(), ids.clone());
        ids
    }

    fn is_merge(&self, id: &str) -> bool {
        self.resolve_commit(id)
            .ok()
            .and_then(|oid| self.repo.find_commit(oid).ok())
            .is_some_and(|c| c.parent_count() > 1)
    }
}

impl CommitLister for GitCli {
    fn list_commits(&self, query: &LogQuery) -> Result<Vec<RawCommit>, VcsError> {
        // New generation: the target may have moved since the last load.
        self.equivalents.borrow_mut().clear();
        let range = match &query.exclude {
            Some(exclude) => format!("{exclude}..{}", query.include),
            None => query.include.clone(),
        };
        let author_arg = query.author.as_ref().map(|a| format!("--author={a}"));
        let mut args = vec!["log", "--date=format:%Y-%m-%d %H:%M", "--numstat", LOG_FORMAT];
        if let Some(author) = &author_arg {
            args.push("--fixed-strings");
            args.push(author);
        }
        args.push(&range);
        args.push("--");
        let out = self.run(&args)?;
        Ok(parse_log(&out))
    }

    fn is_already_applied(&self, id: &str, target: &str) -> bool {
        match self.is_ancestor(id, target) {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => debug!(id, target, error = %e, "ancestry check failed"),
        }
        self.equivalent_ids(target).contains(id)
    }
}

impl DiffSource for GitCli {
    fn fetch_diff(&self, id: &str) -> Result<String, VcsError> {
        self.run(&["show", "--format=", "--no-color", id])
    }

    fn fetch_stats(&self, id: &str) -> Result<String, VcsError> {
        self.run(&["show", "--stat", "--format=", "--no-color", id])
    }
}

impl ConflictInspector for GitCli {
    fn list_conflicted_files(&self) -> Result<Vec<ConflictedFile>, VcsError> {
        let out = self.run(&["status", "--porcelain"])?;
        Ok(parse_status(&out)
            .into_iter()
            .map(|(code, path)| {
                let has_markers = std::fs::read_to_string(self.workdir.join(&path))
                    .map(|text| has_conflict_markers(&text))
                    .unwrap_or(false);
                ConflictedFile {
                    description: describe_status(&code).to_owned(),
                    status_code: code,
                    path,
                    has_markers,
                }
            })
            .collect())
    }

    fn replay_in_progress(&self) -> Option<String> {
        match self.repo.state() {
            RepositoryState::CherryPick | RepositoryState::CherryPickSequence => self
                .repo
                .revparse_single("CHERRY_PICK_HEAD")
                .map(|obj| obj.id().to_string())
                .ok(),
            _ => None,
        }
    }

    fn available_editors(&self) -> Vec<EditorOption> {
        let path = std::env::var_os("PATH").unwrap_or_default();
        let dirs: Vec<PathBuf> = std::env::split_paths(&path).collect();
        discover_editors(&dirs)
    }
}

impl ReplayExecutor for GitCli {
    fn replay_commits(&self, ids: &[String]) -> Result<ReplayOutcome, VcsError> {
        for (i, id) in ids.iter().enumerate() {
            debug!(id, step = i + 1, total = ids.len(), "replaying");
            let mut args = vec!["cherry-pick"];
            if self.is_merge(id) {
                args.extend(["-m", "1"]);
            }
            args.push(id);
            if let Err(e) = self.run(&args) {
                let conflicted = self.list_conflicted_files().unwrap_or_default();
                if conflicted.is_empty() {
                    return Err(e);
                }
                return Ok(ReplayOutcome::ConflictAt { id: id.clone(), remaining: ids[i + 1..].to_vec() });
            }
        }
        Ok(ReplayOutcome::Applied)
    }

    fn continue_replay(&self, paths: &[String]) -> Result<(), VcsError> {
        if !paths.is_empty() {
            let mut args = vec!["add", "--"];
            args.extend(paths.iter().map(String::as_str));
            self.run(&args)?;
        }
        self.run(&["cherry-pick", "--continue"]).map(drop)
    }

    fn skip_replay(&self) -> Result<(), VcsError> {
        self.run(&["cherry-pick", "--skip"]).map(drop)
    }

    fn abort_replay(&self) -> Result<(), VcsError> {
        self.run(&["cherry-pick", "--abort"]).map(drop)
    }

    fn start_interactive_rebase(&self, oldest_id: &str) -> Result<(), VcsError> {
        let parent = format!("{oldest_id}^");
        self.resolve_commit(&parent)?;
        self.run_attached("git", &["rebase", "-i", &parent])
    }

    fn checkout(&self, branch: &str) -> Result<(), VcsError> {
        self.run(&["checkout", branch]).map(drop)
    }

    fn fetch(&self, remote: &str) -> Result<(), VcsError> {
        self.run(&["fetch", remote]).map(drop)
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.run(&["pull", remote, branch]).map(drop)
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.run(&["push", remote, branch]).map(drop)
    }
}

impl RefLister for GitCli {
    fn list_branches(&self) -> Result<Vec<String>, VcsError> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_authors(&self, rev: &str) -> Result<Vec<String>, VcsError> {
        let out = self.run(&["log", "--format=%an", rev, "--"])?;
        let mut authors: Vec<String> =
            out.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_owned).collect();
        authors.sort_by_key(|a| a.to_lowercase());
        authors.dedup();
        Ok(authors)
    }

    fn ref_exists(&self, name: &str) -> bool {
        self.resolve_commit(name).is_ok()
    }

    fn has_remote(&self, name: &str) -> bool {
        self.repo.find_remote(name).is_ok()
    }

    fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(str::to_owned)
    }

    fn user_name(&self) -> Option<String> {
        self.repo.config().ok()?.get_string("user.name").ok()
    }
}

/// Parses the record/field-separated output of `git log --numstat` with [`LOG_FORMAT`].
pub fn parse_log(out: &str) -> Vec<RawCommit> {
    out.split(RECORD_SEP).filter(|r| !r.trim().is_empty()).filter_map(parse_record).collect()
}

fn parse_record(record: &str) -> Option<RawCommit> {
    let mut fields = record.splitn(9, FIELD_SEP);
    let id = fields.next()?.trim().to_owned();
    let short_id = fields.next()?.to_owned();
    let timestamp = fields.next()?.parse().unwrap_or(0);
    let date = fields.next()?.to_owned();
    let author = fields.next()?.to_owned();
    let parent_count = fields.next()?.split_whitespace().count();
    let summary = fields.next()?.to_owned();
    let full_message = fields.next()?.trim_end().to_owned();
    let numstat = fields.next().unwrap_or_default();

    let mut changed_paths = Vec::new();
    let (mut insertions, mut deletions) = (0u64, 0u64);
    for line in numstat.lines().filter(|l| !l.trim().is_empty()) {
        let mut cols = line.splitn(3, '\t');
        let (Some(ins), Some(del), Some(path)) = (cols.next(), cols.next(), cols.next()) else {
            continue;
        };
        // Binary files report "-" for both counts.
        insertions += ins.parse::<u64>().unwrap_or(0);
        deletions += del.parse::<u64>().unwrap_or(0);
        changed_paths.push(path.to_owned());
    }

    Some(RawCommit {
        id,
        short_id,
        summary,
        full_message,
        timestamp,
        date,
        author,
        parent_count,
        changed_paths,
        insertions,
        deletions,
    })
}

/// Ids marked `-` by `git cherry`: an equivalent change already exists upstream.
fn parse_cherry(out: &str) -> HashSet<String> {
    out.lines().filter_map(|l| l.strip_prefix("- ")).map(|id| id.trim().to_owned()).collect()
}

/// Unmerged entries from `git status --porcelain`, as (code, path).
pub fn parse_status(out: &str) -> Vec<(String, String)> {
    out.lines()
        .filter_map(|line| {
            let code = line.get(..2)?;
            let path = line.get(3..)?;
            is_conflict_code(code).then(|| (code.to_owned(), unquote(path)))
        })
        .collect()
}

fn unquote(path: &str) -> String {
    path.strip_prefix('"').and_then(|p| p.strip_suffix('"')).unwrap_or(path).to_owned()
}

fn is_conflict_code(code: &str) -> bool {
    matches!(code, "DD" | "AU" | "UD" | "UA" | "DU" | "AA" | "UU")
}

pub fn describe_status(code: &str) -> &'static str {
    match code {
        "DD" => "both deleted",
        "AU" => "added by us",
        "UD" => "deleted by them",
        "UA" => "added by them",
        "DU" => "deleted by us",
        "AA" => "both added",
        "UU" => "both modified",
        _ => "unmerged",
    }
}

/// True when `text` contains at least one complete `<<<<<<<` / `=======` / `>>>>>>>` block.
pub fn has_conflict_markers(text: &str) -> bool {
    let mut stage = 0u8;
    for line in text.lines() {
        stage = match stage {
            0 if line.starts_with("<<<<<<<") => 1,
            1 if line.starts_with("=======") => 2,
            2 if line.starts_with(">>>>>>>") => return true,
            s => s,
        };
    }
    false
}

/// Known editors found in `dirs`, followed by `git mergetool`.
pub fn discover_editors(dirs: &[PathBuf]) -> Vec<EditorOption> {
    let mut options: Vec<EditorOption> = KNOWN_EDITORS
        .iter()
        .filter(|(cmd, _, _)| dirs.iter().any(|d| d.join(cmd).is_file()))
        .map(|&(cmd, label, terminal)| EditorOption {
            command: cmd.to_owned(),
            description: label.to_owned(),
            terminal,
        })
        .collect();
    options.push(EditorOption {
        command: "mergetool".to_owned(),
        description: "Git mergetool".to_owned(),
        terminal: true,
    });
    options
}
