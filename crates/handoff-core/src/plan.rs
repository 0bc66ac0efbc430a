//! Plan artifacts: `plans/<feature>.md`, produced by the Planner and read by
//! the Executor.

use crate::artifact::{self, ArtifactKind};
use crate::config::Config;
use crate::error::{HandoffError, Result};
use crate::markdown;
use crate::types::{FeatureName, Step};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TASKS_SECTION: &str = "Step-by-Step Tasks";
pub const VALIDATION_SECTION: &str = "Validation Commands";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMeta {
    pub feature: FeatureName,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub producer: Step,
}

/// What the Planner was told up front. Everything else in the template is
/// left for the agent to fill in.
#[derive(Debug, Clone, Default)]
pub struct PlanDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tasks: Vec<String>,
    pub validation: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub feature: FeatureName,
    pub title: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub tasks: Vec<String>,
    pub validation: Vec<String>,
    #[serde(skip)]
    pub body: String,
}

impl Plan {
    /// Write `plans/<feature>.md`. Fails if the plan already exists.
    pub fn create(
        root: &Path,
        config: &Config,
        feature: &FeatureName,
        draft: PlanDraft,
    ) -> Result<Plan> {
        let rel = config.plan_rel(feature);
        let path = root.join(&rel);
        if path.exists() {
            return Err(HandoffError::ArtifactExists(rel));
        }

        let title = draft
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| feature.default_title());
        let meta = PlanMeta {
            feature: feature.clone(),
            title: title.clone(),
            created_at: Utc::now(),
            producer: ArtifactKind::Plan.producer(),
        };
        let body = render_body(
            &title,
            draft.description.as_deref(),
            &draft.tasks,
            &draft.validation,
        );
        let doc = markdown::render_with_front_matter(&meta, &body)?;
        crate::io::create_new(&path, doc.as_bytes()).map_err(|e| match e {
            HandoffError::ArtifactExists(_) => HandoffError::ArtifactExists(rel.clone()),
            other => other,
        })?;
        tracing::debug!(path = %rel, tasks = draft.tasks.len(), "plan created");

        Ok(Plan {
            feature: feature.clone(),
            title,
            path: rel,
            created_at: Some(meta.created_at),
            tasks: draft.tasks,
            validation: draft.validation,
            body,
        })
    }

    /// Read the plan for `feature`; `PlanNotFound` if it was never produced.
    pub fn load(root: &Path, config: &Config, feature: &FeatureName) -> Result<Plan> {
        let rel = config.plan_rel(feature);
        let path = root.join(&rel);
        if !path.is_file() {
            return Err(HandoffError::PlanNotFound(feature.to_string()));
        }
        let raw = artifact::read::<PlanMeta>(&path, &rel)?;
        let tasks = markdown::section(&raw.body, TASKS_SECTION)
            .map(|s| markdown::ordered_items(&s))
            .unwrap_or_default();
        let validation = markdown::section(&raw.body, VALIDATION_SECTION)
            .map(|s| markdown::commands(&s))
            .unwrap_or_default();
        let (title, created_at) = match raw.meta {
            Some(meta) => (meta.title, Some(meta.created_at)),
            None => (
                artifact::heading_title(&raw.body, "Plan:")
                    .unwrap_or_else(|| feature.default_title()),
                None,
            ),
        };
        Ok(Plan {
            feature: feature.clone(),
            title,
            path: rel,
            created_at,
            tasks,
            validation,
            body: raw.body,
        })
    }

    pub fn exists(root: &Path, config: &Config, feature: &FeatureName) -> bool {
        config.plan_path(root, feature).is_file()
    }

    /// All plans under the plans directory, sorted by feature name. Files
    /// whose stem is not a valid feature name are skipped.
    pub fn list(root: &Path, config: &Config) -> Result<Vec<Plan>> {
        let dir = config.plans_dir(root);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut plans = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(feature) = FeatureName::parse(stem) else {
                tracing::debug!(file = %path.display(), "skipping non-plan markdown");
                continue;
            };
            match Plan::load(root, config, &feature) {
                Ok(plan) => plans.push(plan),
                Err(e) => tracing::warn!(feature = %feature, error = %e, "unreadable plan"),
            }
        }
        plans.sort_by(|a, b| a.feature.as_str().cmp(b.feature.as_str()));
        Ok(plans)
    }

    /// Validation commands to run for this plan: its own, else the configured
    /// fallback.
    pub fn validation_or<'a>(&'a self, config: &'a Config) -> &'a [String] {
        if self.validation.is_empty() {
            &config.validation.commands
        } else {
            &self.validation
        }
    }
}

fn render_body(
    title: &str,
    description: Option<&str>,
    tasks: &[String],
    validation: &[String],
) -> String {
    let description = description
        .map(|d| format!("{}\n", d.trim()))
        .unwrap_or_else(|| "_Describe the feature and the value it delivers._\n".to_string());
    let tasks = if tasks.is_empty() {
        "_List the ordered, atomic tasks. Each task names the files it touches and how to validate it._\n"
            .to_string()
    } else {
        tasks
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {t}\n", i + 1))
            .collect()
    };
    let validation = markdown::code_block(
        validation,
        "List the commands that prove the feature works end to end.",
    );

    format!(
        "# Plan: {title}\n\
         \n\
         ## Feature Description\n\
         \n\
         {description}\
         \n\
         ## User Story\n\
         \n\
         _As a <user>, I want <capability> so that <benefit>._\n\
         \n\
         ## Problem Statement\n\
         \n\
         _What is missing or broken today._\n\
         \n\
         ## Solution Statement\n\
         \n\
         _The approach and why it fits the codebase._\n\
         \n\
         ## Context References\n\
         \n\
         _Files, patterns, and docs to read before implementing._\n\
         \n\
         ## {TASKS_SECTION}\n\
         \n\
         {tasks}\
         \n\
         ## Testing Strategy\n\
         \n\
         _Unit, integration, and edge cases to cover._\n\
         \n\
         ## Acceptance Criteria\n\
         \n\
         - [ ] _Observable outcome that marks the feature done._\n\
         \n\
         ## {VALIDATION_SECTION}\n\
         \n\
         {validation}"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn feature(name: &str) -> FeatureName {
        FeatureName::parse(name).unwrap()
    }

    #[test]
    fn load_before_create_is_plan_not_found() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("demo");
        let err = Plan::load(dir.path(), &cfg, &feature("auth")).unwrap_err();
        assert!(matches!(err, HandoffError::PlanNotFound(ref f) if f == "auth"));
        assert!(err.to_string().contains("plan not found"));
    }

    #[test]
    fn create_then_load_preserves_tasks_and_validation() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("demo");
        let draft = PlanDraft {
            title: Some("Auth login".to_string()),
            description: Some("Let users sign in.".to_string()),
            tasks: vec!["Add session model".to_string(), "Add login route".to_string()],
            validation: vec!["cargo test".to_string()],
        };
        Plan::create(dir.path(), &cfg, &feature("auth-login"), draft).unwrap();
        assert!(dir.path().join("plans/auth-login.md").is_file());

        let plan = Plan::load(dir.path(), &cfg, &feature("auth-login")).unwrap();
        assert_eq!(plan.title, "Auth login");
        assert_eq!(plan.tasks, vec!["Add session model", "Add login route"]);
        assert_eq!(plan.validation, vec!["cargo test"]);
        assert!(plan.created_at.is_some());
    }

    #[test]
    fn second_create_fails_and_keeps_first() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("demo");
        let f = feature("search");
        Plan::create(dir.path(), &cfg, &f, PlanDraft::default()).unwrap();
        let before = std::fs::read(dir.path().join("plans/search.md")).unwrap();

        let err = Plan::create(
            dir.path(),
            &cfg,
            &f,
            PlanDraft {
                title: Some("Different".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, HandoffError::ArtifactExists(ref p) if p == "plans/search.md"));
        assert_eq!(std::fs::read(dir.path().join("plans/search.md")).unwrap(), before);
    }

    #[test]
    fn empty_draft_has_no_tasks_and_falls_back_to_config_validation() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("demo");
        cfg.validation.commands = vec!["make check".to_string()];
        Plan::create(dir.path(), &cfg, &feature("x"), PlanDraft::default()).unwrap();

        let plan = Plan::load(dir.path(), &cfg, &feature("x")).unwrap();
        assert_eq!(plan.title, "x");
        assert!(plan.tasks.is_empty());
        assert!(plan.validation.is_empty());
        assert_eq!(plan.validation_or(&cfg), ["make check".to_string()]);
    }

    #[test]
    fn handwritten_plan_is_readable() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("demo");
        std::fs::create_dir_all(dir.path().join("plans")).unwrap();
        std::fs::write(
            dir.path().join("plans/dark-mode.md"),
            "# Plan: Dark mode\n\n## Step-by-Step Tasks\n\n1. Add theme toggle\n",
        )
        .unwrap();

        let plan = Plan::load(dir.path(), &cfg, &feature("dark-mode")).unwrap();
        assert_eq!(plan.title, "Dark mode");
        assert_eq!(plan.tasks, vec!["Add theme toggle"]);
        assert!(plan.created_at.is_none());
    }

    #[test]
    fn list_skips_non_plan_files() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("demo");
        Plan::create(dir.path(), &cfg, &feature("b"), PlanDraft::default()).unwrap();
        Plan::create(dir.path(), &cfg, &feature("a"), PlanDraft::default()).unwrap();
        std::fs::write(dir.path().join("plans/README.md"), "notes").unwrap();
        std::fs::write(dir.path().join("plans/todo.txt"), "notes").unwrap();

        let names: Vec<_> = Plan::list(dir.path(), &cfg)
            .unwrap()
            .into_iter()
            .map(|p| p.feature.to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
