//! The Committer: stage working-tree changes and record a commit with a
//! derived message.

use crate::config::Config;
use crate::error::{HandoffError, Result};
use crate::git::{ChangeKind, Git, StagedChange};
use crate::state::{Outcome, PendingHandoff, State};
use crate::types::Step;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct CommitRequest {
    /// Paths to commit; empty means every change.
    pub paths: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitOutcome {
    pub sha: String,
    pub message: String,
    pub files: Vec<StagedChange>,
}

/// Stage, derive a message, and commit. Records the commit in `state`; the
/// caller saves it.
pub fn commit(
    git: &Git,
    config: &Config,
    state: &mut State,
    request: CommitRequest,
) -> Result<CommitOutcome> {
    git.ensure_no_conflicts()?;
    git.stage(&request.paths)?;

    let files = git.staged_changes(&request.paths)?;
    if files.is_empty() {
        return Err(HandoffError::NothingToCommit);
    }

    let message = match request.message.filter(|m| !m.trim().is_empty()) {
        Some(m) => m,
        None => derive_message(
            state.pending_handoff().as_ref(),
            &files,
            config.commit.max_subject_len,
        ),
    };

    let sha = git.commit(&message, &request.paths)?;
    let subject = message.lines().next().unwrap_or_default();
    state.record_step(
        Step::Commit,
        Some(&sha),
        Outcome::Committed,
        None,
        Some(subject),
    );
    tracing::debug!(sha = %sha, files = files.len(), "committed");

    Ok(CommitOutcome {
        sha,
        message,
        files,
    })
}

/// Commit message for `files`, preferring the pending handoff's description.
pub fn derive_message(
    pending: Option<&PendingHandoff>,
    files: &[StagedChange],
    max_subject_len: usize,
) -> String {
    let subject = match pending {
        Some(PendingHandoff::Feature { name, title }) => {
            format!("feat({name}): implement {title}")
        }
        Some(PendingHandoff::Fix { issue, title }) => format!("fix: {title} (#{issue})"),
        None => inferred_subject(files),
    };
    let subject = truncate_subject(&subject, max_subject_len);

    if pending.is_none() && files.len() > 3 {
        let body: String = files
            .iter()
            .map(|f| format!("- {} {}\n", f.kind.letter(), f.path))
            .collect();
        format!("{subject}\n\n{body}")
    } else {
        subject
    }
}

fn inferred_subject(files: &[StagedChange]) -> String {
    let kind = if files.iter().all(|f| is_doc_path(&f.path)) {
        "docs"
    } else if files.iter().all(|f| is_test_path(&f.path)) {
        "test"
    } else if files.iter().any(|f| f.kind == ChangeKind::Added) {
        "feat"
    } else {
        "chore"
    };
    let verb = if kind == "feat" { "add" } else { "update" };

    let names: Vec<&str> = files.iter().map(|f| file_name(&f.path)).collect();
    let mut listed = names.iter().take(3).copied().collect::<Vec<_>>().join(", ");
    if names.len() > 3 {
        listed.push_str(&format!(" and {} more", names.len() - 3));
    }

    match common_scope(files) {
        Some(scope) => format!("{kind}({scope}): {verb} {listed}"),
        None => format!("{kind}: {verb} {listed}"),
    }
}

fn is_doc_path(path: &str) -> bool {
    path.ends_with(".md") || path.starts_with("docs/") || path.starts_with("plans/")
}

fn is_test_path(path: &str) -> bool {
    let name = file_name(path);
    path.starts_with("tests/")
        || path.contains("/tests/")
        || path.starts_with("test/")
        || path.contains("/test/")
        || name.starts_with("test_")
        || name.contains("_test.")
        || name.contains(".test.")
        || name.contains(".spec.")
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Shared top-level directory, when every path has one and they agree.
fn common_scope(files: &[StagedChange]) -> Option<&str> {
    let mut scope: Option<&str> = None;
    for f in files {
        let (top, _) = f.path.split_once('/')?;
        match scope {
            None => scope = Some(top),
            Some(s) if s == top => {}
            Some(_) => return None,
        }
    }
    scope
}

fn truncate_subject(subject: &str, max: usize) -> String {
    if subject.chars().count() <= max || max < 4 {
        return subject.to_string();
    }
    let kept: String = subject.chars().take(max - 3).collect();
    format!("{}...", kept.trim_end())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn change(kind: ChangeKind, path: &str) -> StagedChange {
        StagedChange {
            kind,
            path: path.to_string(),
        }
    }

    #[test]
    fn pending_feature_wins() {
        let pending = PendingHandoff::Feature {
            name: "auth".to_string(),
            title: "auth login".to_string(),
        };
        let msg = derive_message(
            Some(&pending),
            &[change(ChangeKind::Added, "src/auth.rs")],
            72,
        );
        assert_eq!(msg, "feat(auth): implement auth login");
    }

    #[test]
    fn pending_fix_references_issue() {
        let pending = PendingHandoff::Fix {
            issue: "42".to_string(),
            title: "Crash on empty input".to_string(),
        };
        let msg = derive_message(Some(&pending), &[change(ChangeKind::Modified, "a.rs")], 72);
        assert_eq!(msg, "fix: Crash on empty input (#42)");
    }

    #[test]
    fn docs_only_changes() {
        let msg = derive_message(
            None,
            &[
                change(ChangeKind::Added, "plans/auth.md"),
                change(ChangeKind::Modified, "plans/search.md"),
            ],
            72,
        );
        assert_eq!(msg, "docs(plans): update auth.md, search.md");
    }

    #[test]
    fn tests_only_changes() {
        let msg = derive_message(
            None,
            &[change(ChangeKind::Modified, "crates/core/tests/api.rs")],
            72,
        );
        assert_eq!(msg, "test(crates): update api.rs");
    }

    #[test]
    fn added_files_are_features_without_common_scope() {
        let msg = derive_message(
            None,
            &[
                change(ChangeKind::Added, "src/new.rs"),
                change(ChangeKind::Modified, "Cargo.toml"),
            ],
            72,
        );
        assert_eq!(msg, "feat: add new.rs, Cargo.toml");
    }

    #[test]
    fn modifications_are_chores_and_long_lists_get_a_body() {
        let files: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| change(ChangeKind::Modified, &format!("src/{n}.rs")))
            .collect();
        let msg = derive_message(None, &files, 72);
        let (subject, body) = msg.split_once("\n\n").unwrap();
        assert_eq!(subject, "chore(src): update a.rs, b.rs, c.rs and 2 more");
        assert_eq!(body.lines().count(), 5);
        assert!(body.starts_with("- M src/a.rs"));
    }

    #[test]
    fn subjects_are_truncated() {
        let pending = PendingHandoff::Fix {
            issue: "1".to_string(),
            title: "x".repeat(100),
        };
        let msg = derive_message(Some(&pending), &[], 40);
        assert_eq!(msg.chars().count(), 40);
        assert!(msg.ends_with("..."));
    }
}
