//! Git adapter for the Context Loader and the Committer.
//!
//! A small, explicit wrapper around `git` subprocess calls. Every call runs
//! in the repository root and failures carry git's stderr.

use crate::error::{HandoffError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, instrument, warn};

/// Porcelain XY codes that mean an unmerged path.
const CONFLICT_CODES: &[&str] = &["DD", "AU", "UD", "UA", "DU", "AA", "UU"];

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file.
    pub path: String,
}

impl StatusEntry {
    pub fn is_conflict(&self) -> bool {
        CONFLICT_CODES.contains(&self.code.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Other,
}

impl ChangeKind {
    /// The `--name-status` letter.
    pub fn letter(self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Modified => 'M',
            ChangeKind::Deleted => 'D',
            ChangeKind::Renamed => 'R',
            ChangeKind::Other => '?',
        }
    }
}

/// One line of `git diff --cached --name-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedChange {
    pub kind: ChangeKind,
    pub path: String,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    /// Open the repository at `workdir`, failing if it is not inside a git
    /// work tree or git is not installed.
    pub fn open(workdir: &Path) -> Result<Self> {
        let git = Self {
            workdir: workdir.to_path_buf(),
        };
        let out = git.run(&["rev-parse", "--is-inside-work-tree"])?;
        if !out.status.success() || String::from_utf8_lossy(&out.stdout).trim() != "true" {
            return Err(HandoffError::NotARepository(workdir.display().to_string()));
        }
        Ok(git)
    }

    /// Current branch name; `None` on detached HEAD. Works on unborn branches.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let out = self.run(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        if !out.status.success() {
            debug!("detached HEAD");
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&out.stdout).trim().to_string()))
    }

    /// Short HEAD sha; `None` before the first commit.
    pub fn head_short_sha(&self) -> Result<Option<String>> {
        let out = self.run(&["rev-parse", "--short", "HEAD"])?;
        if !out.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&out.stdout).trim().to_string()))
    }

    /// Latest `n` commits as `<sha> <subject>` lines, newest first.
    pub fn recent_commits(&self, n: usize) -> Result<Vec<String>> {
        let count = n.to_string();
        let out = self.run(&["log", "--oneline", "-n", &count])?;
        if !out.status.success() {
            // unborn branch
            return Ok(Vec::new());
        }
        Ok(String::from_utf8_lossy(&out.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    /// Get status entries (including untracked) in porcelain format.
    pub fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let out = self.run_capture(&["status", "--porcelain=v1", "-uall"])?;
        out.lines()
            .filter(|l| !l.trim().is_empty())
            .map(parse_status_line)
            .collect()
    }

    /// Refuse to proceed when any path is unmerged.
    #[instrument(skip_all)]
    pub fn ensure_no_conflicts(&self) -> Result<()> {
        let conflicted: Vec<String> = self
            .status_porcelain()?
            .into_iter()
            .filter(StatusEntry::is_conflict)
            .map(|e| e.path)
            .collect();
        if conflicted.is_empty() {
            return Ok(());
        }
        warn!(count = conflicted.len(), "unresolved conflicts");
        Err(HandoffError::Conflicted(conflicted))
    }

    /// Stage `paths`, or every change (respecting .gitignore) when empty.
    #[instrument(skip_all, fields(paths = paths.len()))]
    pub fn stage(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            self.run_checked(&["add", "-A"])?;
        } else {
            let mut args = vec!["add", "--"];
            args.extend(paths.iter().map(String::as_str));
            self.run_checked(&args)?;
        }
        Ok(())
    }

    /// Staged changes, optionally limited to `paths`.
    pub fn staged_changes(&self, paths: &[String]) -> Result<Vec<StagedChange>> {
        let mut args = vec!["diff", "--cached", "--name-status"];
        if !paths.is_empty() {
            args.push("--");
            args.extend(paths.iter().map(String::as_str));
        }
        let out = self.run_capture(&args)?;
        Ok(out.lines().filter_map(parse_name_status_line).collect())
    }

    /// Commit what is staged (limited to `paths` when given) and return the
    /// new short sha.
    #[instrument(skip_all)]
    pub fn commit(&self, message: &str, paths: &[String]) -> Result<String> {
        let mut args = vec!["commit", "--quiet", "-m", message];
        if !paths.is_empty() {
            args.push("--");
            args.extend(paths.iter().map(String::as_str));
        }
        debug!(subject = message.lines().next().unwrap_or(""), "committing");
        self.run_checked(&args)?;
        self.head_short_sha()?
            .ok_or_else(|| HandoffError::CommandFailed {
                program: "git".to_string(),
                args: "rev-parse --short HEAD".to_string(),
                stderr: "no HEAD after commit".to_string(),
            })
    }

    fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HandoffError::CommandFailed {
                program: "git".to_string(),
                args: args.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(args = %args.join(" "), "git");
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => HandoffError::ToolMissing("git".to_string()),
                _ => HandoffError::Io(e),
            })
    }
}

fn parse_status_line(line: &str) -> Result<StatusEntry> {
    if let Some(path) = line.strip_prefix("?? ") {
        return Ok(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    if line.len() < 4 {
        return Err(HandoffError::CommandFailed {
            program: "git".to_string(),
            args: "status --porcelain".to_string(),
            stderr: format!("unexpected porcelain line: '{line}'"),
        });
    }
    let code = line[..2].to_string();
    let mut path = line[3..].trim().to_string();
    if let Some((_, new)) = path.split_once("->") {
        path = new.trim().to_string();
    }
    Ok(StatusEntry { code, path })
}

fn parse_name_status_line(line: &str) -> Option<StagedChange> {
    let mut parts = line.split('\t');
    let status = parts.next()?.trim();
    let first = parts.next()?;
    let kind = match status.chars().next()? {
        'A' => ChangeKind::Added,
        'M' | 'T' => ChangeKind::Modified,
        'D' => ChangeKind::Deleted,
        'R' | 'C' => ChangeKind::Renamed,
        _ => ChangeKind::Other,
    };
    // renames and copies list old then new
    let path = parts.next().unwrap_or(first);
    Some(StagedChange {
        kind,
        path: path.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_untracked_line() {
        let e = parse_status_line("?? foo.txt").unwrap();
        assert_eq!(
            e,
            StatusEntry {
                code: "??".to_string(),
                path: "foo.txt".to_string()
            }
        );
    }

    #[test]
    fn parses_rename_line_uses_new_path() {
        let e = parse_status_line("R  old.txt -> new.txt").unwrap();
        assert_eq!(e.path, "new.txt");
    }

    #[test]
    fn conflict_codes() {
        assert!(parse_status_line("UU src/lib.rs").unwrap().is_conflict());
        assert!(parse_status_line("AA both.txt").unwrap().is_conflict());
        assert!(!parse_status_line(" M src/lib.rs").unwrap().is_conflict());
        assert!(!parse_status_line("?? new.txt").unwrap().is_conflict());
    }

    #[test]
    fn parses_name_status() {
        assert_eq!(
            parse_name_status_line("A\tsrc/new.rs"),
            Some(StagedChange {
                kind: ChangeKind::Added,
                path: "src/new.rs".to_string()
            })
        );
        assert_eq!(
            parse_name_status_line("R087\told.rs\tnew.rs").unwrap(),
            StagedChange {
                kind: ChangeKind::Renamed,
                path: "new.rs".to_string()
            }
        );
        assert_eq!(parse_name_status_line(""), None);
    }

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    fn init_repo(dir: &Path) {
        for args in [
            vec!["init", "--quiet"],
            vec!["config", "user.email", "dev@example.test"],
            vec!["config", "user.name", "Dev"],
            vec!["config", "commit.gpgsign", "false"],
        ] {
            let ok = Command::new("git")
                .args(&args)
                .current_dir(dir)
                .status()
                .unwrap()
                .success();
            assert!(ok, "git {args:?} failed");
        }
    }

    #[test]
    fn open_rejects_plain_directory() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        // TempDir lives outside any repository on CI machines; if it does not,
        // the check is meaningless.
        if Command::new("git")
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(dir.path())
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return;
        }
        let err = Git::open(dir.path()).unwrap_err();
        assert!(matches!(err, HandoffError::NotARepository(_)));
    }

    #[test]
    fn stage_and_commit_roundtrip() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        init_repo(dir.path());
        let git = Git::open(dir.path()).unwrap();
        assert_eq!(git.head_short_sha().unwrap(), None);
        assert!(git.recent_commits(5).unwrap().is_empty());

        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();
        git.stage(&["a.txt".to_string()]).unwrap();
        let staged = git.staged_changes(&[]).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].kind, ChangeKind::Added);

        let sha = git.commit("feat: add a", &["a.txt".to_string()]).unwrap();
        assert!(!sha.is_empty());
        assert_eq!(git.recent_commits(5).unwrap().len(), 1);

        let status = git.status_porcelain().unwrap();
        assert_eq!(status.len(), 1);
        assert_eq!(status[0].path, "b.txt");
        git.ensure_no_conflicts().unwrap();
    }
}
