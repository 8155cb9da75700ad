//! Case-insensitive substring filtering over commits and switch candidates.

use crate::types::CommitRecord;

/// True when `query` (already lowercased) occurs in any searchable field.
fn matches_lowered(commit: &CommitRecord, query: &str) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(query);
    hit(&commit.summary)
        || hit(&commit.full_message)
        || hit(&commit.id)
        || hit(&commit.author)
        || commit.changed_paths.iter().any(|p| hit(p))
}

/// Indices of matching commits, in backing order. An empty query keeps everything.
pub fn filter_indices(commits: &[CommitRecord], query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..commits.len()).collect();
    }
    let query = query.to_lowercase();
    commits
        .iter()
        .enumerate()
        .filter(|(_, c)| matches_lowered(c, &query))
        .map(|(i, _)| i)
        .collect()
}

/// Indices of candidates containing `query`, case-insensitively.
pub fn filter_candidates(candidates: &[String], query: &str) -> Vec<usize> {
    let query = query.to_lowercase();
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| query.is_empty() || c.to_lowercase().contains(&query))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawCommit;

    fn commit(id: &str, summary: &str) -> CommitRecord {
        CommitRecord::from_raw(
            RawCommit {
                id: id.into(),
                short_id: id.into(),
                summary: summary.into(),
                full_message: summary.into(),
                author: "Dana".into(),
                changed_paths: vec![format!("src/{id}.rs")],
                ..RawCommit::default()
            },
            false,
        )
    }

    #[test]
    fn fix_matches_first_and_third() {
        let commits =
            vec![commit("a1", "fix bug"), commit("b2", "add feature"), commit("c3", "fixup typo")];
        assert_eq!(filter_indices(&commits, "fix"), vec![0, 2]);
    }

    #[test]
    fn matching_ignores_case_and_covers_paths_and_author() {
        let commits = vec![commit("a1", "Refactor"), commit("b2", "docs")];
        assert_eq!(filter_indices(&commits, "REFACTOR"), vec![0]);
        assert_eq!(filter_indices(&commits, "src/b2"), vec![1]);
        assert_eq!(filter_indices(&commits, "dana"), vec![0, 1]);
    }

    #[test]
    fn empty_query_keeps_every_index() {
        let commits = vec![commit("a1", "x"), commit("b2", "y")];
        assert_eq!(filter_indices(&commits, ""), vec![0, 1]);
    }

    #[test]
    fn no_match_yields_empty_view() {
        let commits = vec![commit("a1", "x")];
        assert!(filter_indices(&commits, "zzz").is_empty());
    }

    #[test]
    fn candidates_filter_case_insensitively() {
        let names: Vec<String> = ["main", "Feature/Login", "dev"].iter().map(|s| s.to_string()).collect();
        assert_eq!(filter_candidates(&names, "feat"), vec![1]);
        assert_eq!(filter_candidates(&names, ""), vec![0, 1, 2]);
    }
}
