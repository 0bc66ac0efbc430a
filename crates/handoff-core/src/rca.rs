//! Root-cause analysis artifacts: `docs/rca/issue-<id>.md`, produced by the
//! Root-Cause Analyzer and read by the Fix Implementer.

use crate::artifact::{self, ArtifactKind};
use crate::config::Config;
use crate::error::{HandoffError, Result};
use crate::markdown;
use crate::paths;
use crate::tracker::{Issue, Tracker};
use crate::types::{IssueId, Step};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PROPOSED_FIX_SECTION: &str = "Proposed Fix";
pub const TESTING_SECTION: &str = "Testing Requirements";
pub const VALIDATION_SECTION: &str = "Validation Commands";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcaMeta {
    pub issue: IssueId,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub fetched_at: DateTime<Utc>,
    pub producer: Step,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rca {
    pub issue: IssueId,
    pub title: String,
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_fix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testing: Option<String>,
    pub validation: Vec<String>,
    #[serde(skip)]
    pub body: String,
}

impl Rca {
    /// Fetch the issue and write `docs/rca/issue-<id>.md`.
    ///
    /// Existence is checked before the tracker is contacted, so re-running
    /// the analyzer on an analyzed issue fails without network access.
    pub fn create(
        root: &Path,
        config: &Config,
        issue_id: IssueId,
        tracker: &dyn Tracker,
    ) -> Result<Rca> {
        let rel = config.rca_rel(issue_id);
        let path = root.join(&rel);
        if path.exists() {
            return Err(HandoffError::ArtifactExists(rel));
        }

        let issue = tracker.fetch_issue(issue_id)?;
        let meta = RcaMeta {
            issue: issue_id,
            title: issue.title.clone(),
            url: issue.url.clone(),
            state: issue.state.clone(),
            labels: issue.labels.clone(),
            fetched_at: Utc::now(),
            producer: ArtifactKind::Rca.producer(),
        };
        let body = render_body(issue_id, &issue);
        let doc = markdown::render_with_front_matter(&meta, &body)?;
        crate::io::create_new(&path, doc.as_bytes()).map_err(|e| match e {
            HandoffError::ArtifactExists(_) => HandoffError::ArtifactExists(rel.clone()),
            other => other,
        })?;
        tracing::debug!(path = %rel, issue = %issue_id, "rca created");

        Ok(Rca {
            issue: issue_id,
            title: issue.title,
            path: rel,
            url: issue.url,
            proposed_fix: None,
            testing: None,
            validation: Vec::new(),
            body,
        })
    }

    /// Read the RCA for `issue_id`; `RcaNotFound` if it was never produced.
    pub fn load(root: &Path, config: &Config, issue_id: IssueId) -> Result<Rca> {
        let rel = config.rca_rel(issue_id);
        let path = root.join(&rel);
        if !path.is_file() {
            return Err(HandoffError::RcaNotFound(issue_id.get()));
        }
        let raw = artifact::read::<RcaMeta>(&path, &rel)?;
        let (title, url) = match raw.meta {
            Some(meta) => (meta.title, meta.url),
            None => (
                artifact::heading_title(&raw.body, &format!("Root Cause Analysis: #{issue_id}"))
                    .unwrap_or_else(|| format!("issue #{issue_id}")),
                String::new(),
            ),
        };
        let proposed_fix = written_section(&raw.body, PROPOSED_FIX_SECTION);
        let testing = written_section(&raw.body, TESTING_SECTION);
        let validation = markdown::section(&raw.body, VALIDATION_SECTION)
            .map(|s| markdown::commands(&s))
            .unwrap_or_default();
        Ok(Rca {
            issue: issue_id,
            title,
            path: rel,
            url,
            proposed_fix,
            testing,
            validation,
            body: raw.body,
        })
    }

    pub fn exists(root: &Path, config: &Config, issue_id: IssueId) -> bool {
        config.rca_path(root, issue_id).is_file()
    }

    /// All RCA documents, sorted by issue number.
    pub fn list(root: &Path, config: &Config) -> Result<Vec<Rca>> {
        let dir = config.rca_dir(root);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(number) = name.to_str().and_then(paths::issue_from_rca_filename) else {
                continue;
            };
            let Ok(issue_id) = IssueId::parse(&number.to_string()) else {
                continue;
            };
            match Rca::load(root, config, issue_id) {
                Ok(rca) => out.push(rca),
                Err(e) => tracing::warn!(issue = number, error = %e, "unreadable rca"),
            }
        }
        out.sort_by_key(|r| r.issue);
        Ok(out)
    }

    pub fn validation_or<'a>(&'a self, config: &'a Config) -> &'a [String] {
        if self.validation.is_empty() {
            &config.validation.commands
        } else {
            &self.validation
        }
    }
}

/// A section's text, unless it is missing or still only the template
/// placeholder.
fn written_section(body: &str, title: &str) -> Option<String> {
    markdown::section(body, title).filter(|s| {
        let trimmed = s.trim();
        !trimmed.is_empty() && !(trimmed.starts_with('_') && trimmed.ends_with('_'))
    })
}

fn render_body(issue_id: IssueId, issue: &Issue) -> String {
    let labels = if issue.labels.is_empty() {
        "none".to_string()
    } else {
        issue.labels.join(", ")
    };
    let reporter = issue.author.as_deref().unwrap_or("unknown");
    let description = if issue.body.trim().is_empty() {
        "_The issue has no description._\n".to_string()
    } else {
        issue
            .body
            .trim()
            .lines()
            .map(|l| if l.is_empty() { ">\n".to_string() } else { format!("> {l}\n") })
            .collect()
    };

    format!(
        "# Root Cause Analysis: #{issue_id} {title}\n\
         \n\
         ## Issue Summary\n\
         \n\
         - **Issue**: #{issue_id}\n\
         - **Title**: {title}\n\
         - **State**: {state}\n\
         - **Labels**: {labels}\n\
         - **Reporter**: {reporter}\n\
         - **URL**: {url}\n\
         \n\
         ## Problem Description\n\
         \n\
         {description}\
         \n\
         ## Reproduction Steps\n\
         \n\
         _Minimal steps that trigger the bug._\n\
         \n\
         ## Root Cause\n\
         \n\
         _The code path at fault and why it misbehaves._\n\
         \n\
         ## Impact Assessment\n\
         \n\
         _Who is affected and how badly._\n\
         \n\
         ## {PROPOSED_FIX_SECTION}\n\
         \n\
         _Files to modify and the change to make in each._\n\
         \n\
         ## {TESTING_SECTION}\n\
         \n\
         _Regression tests that fail before the fix and pass after._\n\
         \n\
         ## {VALIDATION_SECTION}\n\
         \n\
         _Commands that confirm the fix._\n",
        title = issue.title,
        state = issue.state,
        url = issue.url,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
