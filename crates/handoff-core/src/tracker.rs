//! Remote issue tracker access.
//!
//! The tracker is an opaque collaborator: given an issue id it returns the
//! issue's metadata or a classified failure. The default implementation
//! shells out to the GitHub CLI.

use crate::error::{HandoffError, Result};
use crate::types::IssueId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

const ISSUE_FIELDS: &str = "number,title,body,state,url,labels,author,createdAt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

pub trait Tracker {
    fn fetch_issue(&self, id: IssueId) -> Result<Issue>;
}

// ---------------------------------------------------------------------------
// GitHub CLI
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    state: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    labels: Vec<GhLabel>,
    #[serde(default)]
    author: Option<GhAuthor>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhAuthor {
    login: String,
}

impl From<GhIssue> for Issue {
    fn from(gh: GhIssue) -> Self {
        Issue {
            number: gh.number,
            title: gh.title,
            body: gh.body.unwrap_or_default(),
            state: gh.state,
            url: gh.url,
            labels: gh.labels.into_iter().map(|l| l.name).collect(),
            author: gh.author.map(|a| a.login),
            created_at: gh.created_at,
        }
    }
}

/// Parse the JSON printed by `gh issue view --json ...`.
pub fn parse_gh_issue(json: &str) -> Result<Issue> {
    let gh: GhIssue = serde_json::from_str(json)?;
    Ok(gh.into())
}

/// Map a failed `gh issue view` onto the error taxonomy.
pub fn classify_gh_failure(id: IssueId, stderr: &str) -> HandoffError {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("gh auth login")
        || lower.contains("not logged")
        || lower.contains("authentication")
        || lower.contains("bad credentials")
        || lower.contains("http 401")
    {
        return HandoffError::TrackerUnauthenticated(stderr.trim().to_string());
    }
    if lower.contains("could not resolve to an issue") || lower.contains("http 404") {
        return HandoffError::IssueNotFound(id.get());
    }
    HandoffError::CommandFailed {
        program: "gh".to_string(),
        args: format!("issue view {id}"),
        stderr: stderr.trim().to_string(),
    }
}

/// Fetches issues with `<program> issue view`, run from the repository root
/// so the CLI resolves the repository from its git remote.
#[derive(Debug, Clone)]
pub struct GhTracker {
    program: String,
    workdir: PathBuf,
}

impl GhTracker {
    pub fn new(program: impl Into<String>, workdir: &Path) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.to_path_buf(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether the tracker program resolves on `PATH`.
    pub fn is_installed(&self) -> bool {
        which::which(&self.program).is_ok()
    }
}

impl Tracker for GhTracker {
    fn fetch_issue(&self, id: IssueId) -> Result<Issue> {
        let number = id.to_string();
        tracing::debug!(program = %self.program, issue = %id, "fetching issue");
        let output = Command::new(&self.program)
            .args(["issue", "view", &number, "--json", ISSUE_FIELDS])
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => HandoffError::ToolMissing(self.program.clone()),
                _ => HandoffError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(issue = %id, stderr = %stderr.trim(), "issue fetch failed");
            return Err(classify_gh_failure(id, &stderr));
        }
        parse_gh_issue(&String::from_utf8_lossy(&output.stdout))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> IssueId {
        IssueId::parse(&n.to_string()).unwrap()
    }

    #[test]
    fn parses_gh_json() {
        let json = r#"{
            "number": 42,
            "title": "Crash on empty input",
            "body": "Steps:\n1. run with ''",
            "state": "OPEN",
            "url": "https://github.com/acme/app/issues/42",
            "labels": [{"name": "bug"}, {"name": "p1"}],
            "author": {"login": "octocat"},
            "createdAt": "2026-01-05T10:00:00Z"
        }"#;
        let issue = parse_gh_issue(json).unwrap();
        assert_eq!(issue.number, 42);
        assert_eq!(issue.labels, vec!["bug", "p1"]);
        assert_eq!(issue.author.as_deref(), Some("octocat"));
        assert!(issue.created_at.is_some());
    }

    #[test]
    fn null_body_is_empty() {
        let issue = parse_gh_issue(r#"{"number": 1, "title": "t", "body": null}"#).unwrap();
        assert_eq!(issue.body, "");
        assert!(issue.labels.is_empty());
    }

    #[test]
    fn classifies_auth_failures() {
        let err = classify_gh_failure(
            id(3),
            "To get started with GitHub CLI, please run:  gh auth login",
        );
        assert!(matches!(err, HandoffError::TrackerUnauthenticated(_)));
    }

    #[test]
    fn classifies_missing_issue() {
        let err = classify_gh_failure(
            id(999),
            "GraphQL: Could not resolve to an issue or pull request with the number of 999.",
        );
        assert!(matches!(err, HandoffError::IssueNotFound(999)));
    }

    #[test]
    fn missing_repository_is_not_a_missing_issue() {
        let err = classify_gh_failure(id(8), "GraphQL: repository not found (repository)");
        assert!(matches!(err, HandoffError::CommandFailed { .. }));
    }

    #[test]
    fn other_failures_keep_stderr() {
        let err = classify_gh_failure(id(5), "network unreachable\n");
        assert!(
            matches!(err, HandoffError::CommandFailed { ref stderr, .. } if stderr == "network unreachable")
        );
    }

    #[test]
    fn missing_program_is_tool_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let tracker = GhTracker::new("handoff-no-such-tracker-binary", dir.path());
        let err = tracker.fetch_issue(id(1)).unwrap_err();
        assert!(matches!(err, HandoffError::ToolMissing(_)));
        assert!(!tracker.is_installed());
    }
}
