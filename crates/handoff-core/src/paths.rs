use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const HANDOFF_DIR: &str = ".handoff";
pub const CONFIG_FILE: &str = ".handoff/config.yaml";
pub const STATE_FILE: &str = ".handoff/state.yaml";
pub const LEDGER_IGNORE_FILE: &str = ".handoff/.gitignore";

/// Keeps the ledger, and this ignore file itself, out of version control.
pub const LEDGER_IGNORE: &str = "state.yaml\n.gitignore\n";

pub const DEFAULT_PLANS_DIR: &str = "plans";
pub const DEFAULT_RCA_DIR: &str = "docs/rca";

pub const CLAUDE_COMMANDS_DIR: &str = ".claude/commands";

/// Repository files the context loader reports when present.
pub const KEY_DOCS: &[&str] = &["README.md", "CLAUDE.md", "AGENTS.md"];

/// Top-level entries the context loader never lists.
pub const IGNORED_ENTRIES: &[&str] = &[".git", "target", "node_modules"];

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn handoff_dir(root: &Path) -> PathBuf {
    root.join(HANDOFF_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn ledger_ignore_path(root: &Path) -> PathBuf {
    root.join(LEDGER_IGNORE_FILE)
}

/// `<plans_dir>/<feature>.md`, relative to the repository root.
pub fn plan_rel(plans_dir: &str, feature: &str) -> String {
    format!("{}/{feature}.md", plans_dir.trim_end_matches('/'))
}

/// `<rca_dir>/issue-<id>.md`, relative to the repository root.
pub fn rca_rel(rca_dir: &str, issue: u64) -> String {
    format!("{}/issue-{issue}.md", rca_dir.trim_end_matches('/'))
}

pub fn claude_commands_dir(root: &Path) -> PathBuf {
    root.join(CLAUDE_COMMANDS_DIR)
}

pub fn user_claude_commands_dir() -> Option<PathBuf> {
    home::home_dir().map(|h| h.join(CLAUDE_COMMANDS_DIR))
}

/// Parse the issue number back out of an `issue-<id>.md` file name.
pub fn issue_from_rca_filename(name: &str) -> Option<u64> {
    name.strip_prefix("issue-")?
        .strip_suffix(".md")?
        .parse()
        .ok()
        .filter(|n| *n > 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_follow_layout() {
        assert_eq!(plan_rel(DEFAULT_PLANS_DIR, "auth-login"), "plans/auth-login.md");
        assert_eq!(rca_rel(DEFAULT_RCA_DIR, 42), "docs/rca/issue-42.md");
        assert_eq!(plan_rel("work/plans/", "x"), "work/plans/x.md");
    }

    #[test]
    fn ledger_paths() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.handoff/config.yaml")
        );
        assert_eq!(
            state_path(root),
            PathBuf::from("/tmp/proj/.handoff/state.yaml")
        );
    }

    #[test]
    fn rca_filenames() {
        assert_eq!(issue_from_rca_filename("issue-17.md"), Some(17));
        assert_eq!(issue_from_rca_filename("issue-0.md"), None);
        assert_eq!(issue_from_rca_filename("issue-x.md"), None);
        assert_eq!(issue_from_rca_filename("notes.md"), None);
    }
}
