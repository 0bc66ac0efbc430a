use crate::output::print_json;
use crate::templates;
use anyhow::Context;
use handoff_core::{
    config::{self, Config},
    io, paths,
    state::State,
    tracker::GhTracker,
    types::Step,
    HandoffError,
};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Action {
    Created,
    Updated,
    Kept,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Kept => "exists",
        }
    }
}

#[derive(Debug, Serialize)]
struct Entry {
    path: String,
    action: Action,
}

#[derive(Debug, Serialize)]
struct InitReport {
    root: String,
    entries: Vec<Entry>,
    tracker_installed: bool,
}

pub fn run(root: &Path, force: bool, user: bool, json: bool) -> anyhow::Result<()> {
    let mut entries = Vec::new();

    io::ensure_dir(&paths::handoff_dir(root)).context("failed to create .handoff/")?;

    // Config and ledger are never overwritten, even with --force.
    let config = if paths::config_path(root).exists() {
        entries.push(entry(paths::CONFIG_FILE, Action::Kept));
        Config::load(root).context("failed to load config.yaml")?
    } else {
        let cfg = Config::new(config::project_name_for(root));
        cfg.save(root).context("failed to write config.yaml")?;
        entries.push(entry(paths::CONFIG_FILE, Action::Created));
        cfg
    };

    if paths::state_path(root).exists() {
        entries.push(entry(paths::STATE_FILE, Action::Kept));
    } else {
        State::new(config.project.name.clone())
            .save(root)
            .context("failed to write state.yaml")?;
        entries.push(entry(paths::STATE_FILE, Action::Created));
    }

    for (rel, dir) in [
        (&config.paths.plans_dir, config.plans_dir(root)),
        (&config.paths.rca_dir, config.rca_dir(root)),
    ] {
        let action = if dir.is_dir() {
            Action::Kept
        } else {
            Action::Created
        };
        io::ensure_dir(&dir).with_context(|| format!("failed to create {rel}/"))?;
        entries.push(entry(&format!("{rel}/"), action));
    }

    entries.extend(write_templates(
        &paths::claude_commands_dir(root),
        paths::CLAUDE_COMMANDS_DIR,
        force,
    )?);

    if user {
        let dir = paths::user_claude_commands_dir().ok_or(HandoffError::HomeNotFound)?;
        entries.extend(write_templates(&dir, "~/.claude/commands", true)?);
    }

    let tracker = GhTracker::new(&config.tracker.command, root);
    let tracker_installed = tracker.is_installed();
    if !tracker_installed {
        tracing::warn!(
            program = tracker.program(),
            "issue tracker CLI not found on PATH; rca will fail until it is installed"
        );
    }

    if json {
        return print_json(&InitReport {
            root: root.display().to_string(),
            entries,
            tracker_installed,
        });
    }

    println!("Initialized handoff in {}", root.display());
    for e in &entries {
        println!("  {}: {}", e.action.label(), e.path);
    }
    if !tracker_installed {
        println!(
            "note: '{}' not found; install it to use handoff rca",
            tracker.program()
        );
    }
    println!("\nNext: handoff prime");
    Ok(())
}

/// Write one slash-command file per step into `dir`. Existing files are kept
/// unless `overwrite` is set.
fn write_templates(
    dir: &Path,
    display_prefix: &str,
    overwrite: bool,
) -> anyhow::Result<Vec<Entry>> {
    io::ensure_dir(dir).with_context(|| format!("failed to create {display_prefix}/"))?;

    let mut entries = Vec::new();
    for step in Step::all() {
        let filename = templates::filename(*step);
        let path = dir.join(&filename);
        let shown = format!("{display_prefix}/{filename}");
        let content = templates::template(*step).as_bytes();

        let action = if overwrite {
            let existed = path.exists();
            io::atomic_write(&path, content).with_context(|| format!("failed to write {shown}"))?;
            if existed {
                Action::Updated
            } else {
                Action::Created
            }
        } else if io::write_if_missing(&path, content)
            .with_context(|| format!("failed to write {shown}"))?
        {
            Action::Created
        } else {
            Action::Kept
        };
        entries.push(Entry {
            path: shown,
            action,
        });
    }
    Ok(entries)
}

fn entry(path: &str, action: Action) -> Entry {
    Entry {
        path: path.to_string(),
        action,
    }
}
