use handoff_core::paths::HANDOFF_DIR;
use std::path::{Path, PathBuf};

/// Resolve the repository root.
///
/// Priority:
/// 1. `--root` flag / `HANDOFF_ROOT` env var (passed in as `explicit`)
/// 2. The nearest ancestor of `cwd` containing `.handoff/`
/// 3. The nearest ancestor of `cwd` containing `.git`
/// 4. `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(&cwd)
}

fn resolve_from(start: &Path) -> PathBuf {
    find_upward(start, |dir| dir.join(HANDOFF_DIR).is_dir())
        // `.git` is a file inside worktrees and submodules.
        .or_else(|| find_upward(start, |dir| dir.join(".git").exists()))
        .unwrap_or_else(|| start.to_path_buf())
}

fn find_upward(start: &Path, is_root: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|&dir| is_root(dir)).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn handoff_dir_beats_git() {
        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("svc");
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::create_dir_all(inner.join(HANDOFF_DIR)).unwrap();
        let deep = inner.join("src/deep");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(resolve_from(&deep), inner);
    }

    #[test]
    fn falls_back_to_git_then_start() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a/b");
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(dir.path().join(".git"), "gitdir: elsewhere").unwrap();
        assert_eq!(resolve_from(&deep), dir.path());

        let bare = TempDir::new().unwrap();
        let inside_repo = bare
            .path()
            .ancestors()
            .any(|d| d.join(".git").exists() || d.join(HANDOFF_DIR).is_dir());
        if !inside_repo {
            assert_eq!(resolve_from(bare.path()), bare.path());
        }
    }
}
