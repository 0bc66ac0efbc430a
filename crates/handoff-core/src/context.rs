//! The Context Loader: a read-only snapshot of repository state for an agent
//! starting a session.

use crate::config::Config;
use crate::error::Result;
use crate::git::Git;
use crate::paths;
use crate::plan::Plan;
use crate::rca::Rca;
use crate::state::{HistoryEntry, State};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

const RECENT_COMMITS: usize = 5;
const RECENT_STEPS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct VcsSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    pub dirty_files: usize,
    pub recent_commits: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanLine {
    pub feature: String,
    pub title: String,
    pub tasks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RcaLine {
    pub issue: u64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub project: String,
    pub root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs: Option<VcsSummary>,
    pub entries: Vec<String>,
    pub key_docs: Vec<String>,
    pub plans: Vec<PlanLine>,
    pub rcas: Vec<RcaLine>,
    pub recent_steps: Vec<HistoryEntry>,
}

impl ContextSummary {
    /// Gather the summary. Only failing to read `root` itself is an error; a
    /// missing repository or unreadable artifact just leaves its part empty.
    pub fn load(root: &Path, config: &Config, state: &State) -> Result<Self> {
        let mut entries: Vec<String> = std::fs::read_dir(root)?
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let name = e.file_name().to_string_lossy().into_owned();
                if paths::IGNORED_ENTRIES.contains(&name.as_str()) {
                    return None;
                }
                let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
                Some(if is_dir { format!("{name}/") } else { name })
            })
            .collect();
        entries.sort();

        let key_docs = paths::KEY_DOCS
            .iter()
            .filter(|d| root.join(d).is_file())
            .map(|d| d.to_string())
            .collect();

        let vcs = match Git::open(root) {
            Ok(git) => Some(vcs_summary(&git)?),
            Err(e) => {
                tracing::debug!(error = %e, "no git summary");
                None
            }
        };

        let plans = Plan::list(root, config)?
            .into_iter()
            .map(|p| PlanLine {
                feature: p.feature.to_string(),
                title: p.title,
                tasks: p.tasks.len(),
            })
            .collect();
        let rcas = Rca::list(root, config)?
            .into_iter()
            .map(|r| RcaLine {
                issue: r.issue.get(),
                title: r.title,
            })
            .collect();

        Ok(Self {
            project: config.project.name.clone(),
            root: root.display().to_string(),
            vcs,
            entries,
            key_docs,
            plans,
            rcas,
            recent_steps: state.recent(RECENT_STEPS).to_vec(),
        })
    }

    /// Human-readable rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Project: {}", self.project);
        let _ = writeln!(out, "Root:    {}", self.root);

        match &self.vcs {
            Some(vcs) => {
                let _ = writeln!(
                    out,
                    "Branch:  {} @ {}",
                    vcs.branch.as_deref().unwrap_or("(detached)"),
                    vcs.head.as_deref().unwrap_or("(no commits)")
                );
                let _ = writeln!(out, "Dirty:   {} file(s)", vcs.dirty_files);
                if !vcs.recent_commits.is_empty() {
                    let _ = writeln!(out, "\nRecent commits:");
                    for c in &vcs.recent_commits {
                        let _ = writeln!(out, "  {c}");
                    }
                }
            }
            None => {
                let _ = writeln!(out, "Branch:  (not a git repository)");
            }
        }

        let _ = writeln!(out, "\nStructure:");
        for e in &self.entries {
            let _ = writeln!(out, "  {e}");
        }

        if !self.key_docs.is_empty() {
            let _ = writeln!(out, "\nKey docs: {}", self.key_docs.join(", "));
        }

        let _ = writeln!(out, "\nPlans ({}):", self.plans.len());
        for p in &self.plans {
            let _ = writeln!(out, "  {:<24} {} task(s)  {}", p.feature, p.tasks, p.title);
        }

        let _ = writeln!(out, "\nRCAs ({}):", self.rcas.len());
        for r in &self.rcas {
            let _ = writeln!(out, "  #{:<8} {}", r.issue, r.title);
        }

        if !self.recent_steps.is_empty() {
            let _ = writeln!(out, "\nRecent steps:");
            for s in &self.recent_steps {
                let _ = writeln!(
                    out,
                    "  {}  {:<14} {:<18} {}",
                    s.timestamp.format("%Y-%m-%d %H:%M"),
                    s.step.as_str(),
                    s.subject.as_deref().unwrap_or("-"),
                    s.outcome.as_str()
                );
            }
        }
        out
    }
}

fn vcs_summary(git: &Git) -> Result<VcsSummary> {
    Ok(VcsSummary {
        branch: git.current_branch()?,
        head: git.head_short_sha()?,
        dirty_files: git.status_porcelain()?.len(),
        recent_commits: git.recent_commits(RECENT_COMMITS)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::PlanDraft;
    use crate::state::Outcome;
    use crate::types::{FeatureName, Step};
    use tempfile::TempDir;

    #[test]
    fn summarizes_layout_plans_and_history() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let cfg = Config::new("demo");
        std::fs::write(root.join("README.md"), "# Demo").unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join("node_modules")).unwrap();
        Plan::create(
            root,
            &cfg,
            &FeatureName::parse("auth").unwrap(),
            PlanDraft {
                tasks: vec!["one".to_string(), "two".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        let mut state = State::new("demo");
        state.record_step(Step::Planning, Some("auth"), Outcome::Completed, None, None);

        let summary = ContextSummary::load(root, &cfg, &state).unwrap();
        assert_eq!(summary.project, "demo");
        assert!(summary.entries.contains(&"src/".to_string()));
        assert!(summary.entries.contains(&"README.md".to_string()));
        assert!(!summary.entries.iter().any(|e| e.starts_with("node_modules")));
        assert_eq!(summary.key_docs, vec!["README.md"]);
        assert_eq!(summary.plans.len(), 1);
        assert_eq!(summary.plans[0].tasks, 2);
        assert_eq!(summary.recent_steps.len(), 1);

        let text = summary.render();
        assert!(text.contains("Project: demo"));
        assert!(text.contains("Plans (1):"));
        assert!(text.contains("auth"));
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let state = State::new("demo");
        assert!(ContextSummary::load(&missing, &Config::new("demo"), &state).is_err());
    }
}
