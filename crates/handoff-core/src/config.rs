use crate::error::Result;
use crate::paths;
use crate::types::{FeatureName, IssueId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// PathsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_plans_dir")]
    pub plans_dir: String,
    #[serde(default = "default_rca_dir")]
    pub rca_dir: String,
}

fn default_plans_dir() -> String {
    paths::DEFAULT_PLANS_DIR.to_string()
}

fn default_rca_dir() -> String {
    paths::DEFAULT_RCA_DIR.to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            plans_dir: default_plans_dir(),
            rca_dir: default_rca_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// TrackerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Program invoked as `<command> issue view <id> --json ...`.
    #[serde(default = "default_tracker_command")]
    pub command: String,
}

fn default_tracker_command() -> String {
    "gh".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            command: default_tracker_command(),
        }
    }
}

// ---------------------------------------------------------------------------
// CommitConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitConfig {
    #[serde(default = "default_max_subject_len")]
    pub max_subject_len: usize,
}

fn default_max_subject_len() -> usize {
    72
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            max_subject_len: default_max_subject_len(),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationConfig
// ---------------------------------------------------------------------------

/// Fallback validation commands for artifacts that list none of their own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub commands: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub commit: CommitConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: ProjectConfig {
                name: project_name.into(),
                description: None,
            },
            paths: PathsConfig::default(),
            tracker: TrackerConfig::default(),
            commit: CommitConfig::default(),
            validation: ValidationConfig::default(),
        }
    }

    /// Load `.handoff/config.yaml`, or fall back to defaults named after the
    /// root directory when the repository was never initialized.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::new(project_name_for(root)));
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn plan_rel(&self, feature: &FeatureName) -> String {
        paths::plan_rel(&self.paths.plans_dir, feature.as_str())
    }

    pub fn plan_path(&self, root: &Path, feature: &FeatureName) -> PathBuf {
        root.join(self.plan_rel(feature))
    }

    pub fn rca_rel(&self, issue: IssueId) -> String {
        paths::rca_rel(&self.paths.rca_dir, issue.get())
    }

    pub fn rca_path(&self, root: &Path, issue: IssueId) -> PathBuf {
        root.join(self.rca_rel(issue))
    }

    pub fn plans_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.plans_dir)
    }

    pub fn rca_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.rca_dir)
    }
}

/// Directory name of `root`, or "project" when it has none.
pub fn project_name_for(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new("test-project");
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.project.name, "test-project");
        assert_eq!(parsed.paths.plans_dir, "plans");
        assert_eq!(parsed.tracker.command, "gh");
        assert_eq!(parsed.commit.max_subject_len, 72);
    }

    #[test]
    fn sparse_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("project:\n  name: demo\n").unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.paths.rca_dir, "docs/rca");
        assert!(cfg.validation.commands.is_empty());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.project.name, project_name_for(dir.path()));
    }

    #[test]
    fn configured_dirs_drive_artifact_paths() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("demo");
        cfg.paths.plans_dir = "work/plans".to_string();
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        let feature = FeatureName::parse("search").unwrap();
        assert_eq!(loaded.plan_rel(&feature), "work/plans/search.md");
        assert_eq!(
            loaded.rca_rel(IssueId::parse("9").unwrap()),
            "docs/rca/issue-9.md"
        );
    }
}
