use crate::error::Result;
use crate::paths;
use crate::types::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Oldest entries are dropped past this many.
pub const HISTORY_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    ValidationFailed,
    Committed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::ValidationFailed => "validation_failed",
            Outcome::Committed => "committed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub step: Step,
    /// Feature name, issue number, or commit sha, depending on the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    /// Title carried forward so the Committer can describe the handoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Work finished by the Executor or Fix Implementer that no commit has
/// picked up yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingHandoff {
    Feature { name: String, title: String },
    Fix { issue: String, title: String },
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: String,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub last_updated: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl State {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: project.into(),
            history: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the ledger, or start an empty one when none has been written yet.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::state_path(root);
        if !path.exists() {
            return Ok(Self::new(crate::config::project_name_for(root)));
        }
        let data = std::fs::read_to_string(&path)?;
        let state: State = serde_yaml::from_str(&data)?;
        Ok(state)
    }

    /// Write the ledger. The first save also drops `.handoff/.gitignore` so
    /// recording a step never dirties the working tree.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::state_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        crate::io::write_if_missing(
            &paths::ledger_ignore_path(root),
            paths::LEDGER_IGNORE.as_bytes(),
        )?;
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }
        self.last_updated = Utc::now();
    }

    pub fn record_step(
        &mut self,
        step: Step,
        subject: Option<&str>,
        outcome: Outcome,
        artifact: Option<&str>,
        title: Option<&str>,
    ) {
        self.record(HistoryEntry {
            step,
            subject: subject.map(str::to_string),
            outcome,
            artifact: artifact.map(str::to_string),
            title: title.map(str::to_string),
            timestamp: Utc::now(),
        });
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// The latest successful execute or implement-fix with no commit after it.
    pub fn pending_handoff(&self) -> Option<PendingHandoff> {
        for entry in self.history.iter().rev() {
            match (entry.step, entry.outcome) {
                (Step::Commit, _) => return None,
                (Step::Execute, Outcome::Completed) => {
                    let name = entry.subject.clone()?;
                    let title = entry.title.clone().unwrap_or_else(|| name.replace('-', " "));
                    return Some(PendingHandoff::Feature { name, title });
                }
                (Step::ImplementFix, Outcome::Completed) => {
                    let issue = entry.subject.clone()?;
                    let title = entry
                        .title
                        .clone()
                        .unwrap_or_else(|| format!("resolve issue #{issue}"));
                    return Some(PendingHandoff::Fix { issue, title });
                }
                _ => continue,
            }
        }
        None
    }

    /// Index and entry of the latest `step` run for `subject`.
    pub fn last_for(&self, step: Step, subject: &str) -> Option<(usize, &HistoryEntry)> {
        self.history
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| e.step == step && e.subject.as_deref() == Some(subject))
    }

    /// Whether a commit was recorded after the entry at `index`.
    pub fn committed_after(&self, index: usize) -> bool {
        self.history
            .iter()
            .skip(index + 1)
            .any(|e| e.step == Step::Commit)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_ledger_starts_empty() {
        let dir = TempDir::new().unwrap();
        let state = State::load(dir.path()).unwrap();
        assert!(state.history.is_empty());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut state = State::new("demo");
        state.record_step(
            Step::Planning,
            Some("auth"),
            Outcome::Completed,
            Some("plans/auth.md"),
            Some("Auth"),
        );
        state.save(dir.path()).unwrap();

        let ignore = std::fs::read_to_string(paths::ledger_ignore_path(dir.path())).unwrap();
        assert!(ignore.lines().any(|l| l == "state.yaml"));

        let loaded = State::load(dir.path()).unwrap();
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.history[0].step, Step::Planning);
        assert_eq!(loaded.history[0].artifact.as_deref(), Some("plans/auth.md"));
    }

    #[test]
    fn history_is_capped() {
        let mut state = State::new("demo");
        for i in 0..HISTORY_LIMIT + 5 {
            state.record_step(Step::Prime, Some(&i.to_string()), Outcome::Completed, None, None);
        }
        assert_eq!(state.history.len(), HISTORY_LIMIT);
        assert_eq!(state.history[0].subject.as_deref(), Some("5"));
        assert_eq!(state.recent(2).len(), 2);
    }

    #[test]
    fn pending_handoff_tracks_latest_uncommitted_work() {
        let mut state = State::new("demo");
        assert_eq!(state.pending_handoff(), None);

        state.record_step(
            Step::Execute,
            Some("auth"),
            Outcome::Completed,
            None,
            Some("Auth login"),
        );
        assert_eq!(
            state.pending_handoff(),
            Some(PendingHandoff::Feature {
                name: "auth".to_string(),
                title: "Auth login".to_string()
            })
        );

        state.record_step(Step::Commit, Some("abc123"), Outcome::Committed, None, None);
        assert_eq!(state.pending_handoff(), None);

        state.record_step(Step::ImplementFix, Some("12"), Outcome::Completed, None, None);
        state.record_step(Step::Prime, None, Outcome::Completed, None, None);
        assert_eq!(
            state.pending_handoff(),
            Some(PendingHandoff::Fix {
                issue: "12".to_string(),
                title: "resolve issue #12".to_string()
            })
        );
    }

    #[test]
    fn failed_validation_is_not_a_handoff() {
        let mut state = State::new("demo");
        state.record_step(Step::Execute, Some("auth"), Outcome::ValidationFailed, None, None);
        assert_eq!(state.pending_handoff(), None);
    }
}
