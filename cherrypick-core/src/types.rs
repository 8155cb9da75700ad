/// One row from the source branch's history.
///
/// Populated in bulk by the loader and immutable until the next reload, which
/// replaces the whole sequence. `id` is unique within a load generation and
/// `is_merge` always equals `parent_count > 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,           // full object id
    pub short_id: String,
    pub summary: String,      // first line of the message
    pub full_message: String,
    pub display_line: String, // "<short_id> <summary>", like `git log --oneline`
    pub timestamp: i64,       // author time, Unix seconds
    pub date: String,         // "%Y-%m-%d %H:%M" as formatted by git
    pub author: String,
    pub is_merge: bool,
    pub parent_count: usize,
    pub changed_paths: Vec<String>,
    pub insertions: u64,
    pub deletions: u64,
    pub already_applied: bool,
}

/// A commit as reported by the collaborator, before the applied check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCommit {
    pub id: String,
    pub short_id: String,
    pub summary: String,
    pub full_message: String,
    pub timestamp: i64,
    pub date: String,
    pub author: String,
    pub parent_count: usize,
    pub changed_paths: Vec<String>,
    pub insertions: u64,
    pub deletions: u64,
}

impl CommitRecord {
    /// Builds a record from a raw collaborator row.
    pub fn from_raw(raw: RawCommit, already_applied: bool) -> Self {
        let parent_count = raw.parent_count.max(1);
        Self {
            display_line: format!("{} {}", raw.short_id, raw.summary),
            id: raw.id,
            short_id: raw.short_id,
            summary: raw.summary,
            full_message: raw.full_message,
            timestamp: raw.timestamp,
            date: raw.date,
            author: raw.author,
            is_merge: parent_count > 1,
            parent_count,
            changed_paths: raw.changed_paths,
            insertions: raw.insertions,
            deletions: raw.deletions,
            already_applied,
        }
    }
}

/// A path the in-progress replay left unmerged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedFile {
    pub path: String,
    pub status_code: String, // two-letter porcelain code, e.g. "UU"
    pub description: String,
    pub has_markers: bool,
}

/// Result of replaying a batch of commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Every commit applied cleanly.
    Applied,
    /// Replay stopped on `id`; `remaining` were never attempted.
    ConflictAt { id: String, remaining: Vec<String> },
}

/// An external tool the operator can use to resolve conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOption {
    /// Executable name, or `"mergetool"` for `git mergetool`.
    pub command: String,
    pub description: String,
    /// Terminal editors take over the tty; GUI editors are waited on too.
    pub terminal: bool,
}

impl EditorOption {
    pub fn is_mergetool(&self) -> bool {
        self.command == "mergetool"
    }
}

/// Which scope field a switch session overwrites on confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind {
    SourceBranch,
    TargetBranch,
    Author,
}

impl SwitchKind {
    pub fn label(self) -> &'static str {
        match self {
            SwitchKind::SourceBranch => "Source Branch",
            SwitchKind::TargetBranch => "Target Branch",
            SwitchKind::Author => "Author",
        }
    }
}

/// The refs and author the commit list is computed from.
///
/// Seeded from configuration and the operator's identity at startup, then
/// rewritten by switch sessions. The core never writes back to the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub source_branch: String,
    pub target_branch: String,
    pub author: String,
    pub remote: String,
}

impl Scope {
    /// The current value of the field `kind` targets.
    pub fn get(&self, kind: SwitchKind) -> &str {
        match kind {
            SwitchKind::SourceBranch => &self.source_branch,
            SwitchKind::TargetBranch => &self.target_branch,
            SwitchKind::Author => &self.author,
        }
    }

    pub fn set(&mut self, kind: SwitchKind, value: String) {
        match kind {
            SwitchKind::SourceBranch => self.source_branch = value,
            SwitchKind::TargetBranch => self.target_branch = value,
            SwitchKind::Author => self.author = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_derives_merge_flag_and_display_line() {
        let raw = RawCommit {
            id: "a".repeat(40),
            short_id: "aaaaaaa".into(),
            summary: "Merge branch 'x'".into(),
            parent_count: 2,
            ..RawCommit::default()
        };
        let rec = CommitRecord::from_raw(raw, false);
        assert!(rec.is_merge);
        assert_eq!(rec.display_line, "aaaaaaa Merge branch 'x'");
    }

    #[test]
    fn from_raw_never_reports_zero_parents() {
        let rec = CommitRecord::from_raw(RawCommit::default(), false);
        assert_eq!(rec.parent_count, 1);
        assert!(!rec.is_merge);
    }
}
