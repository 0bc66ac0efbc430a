use super::{first_line, load_config, load_state};
use crate::output::print_json;
use anyhow::Context;
use handoff_core::{
    commit::{self, CommitOutcome, CommitRequest},
    config::Config,
    git::Git,
    state::State,
};
use std::path::Path;

pub fn run(
    root: &Path,
    files: Vec<String>,
    message: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let mut state = load_state(root)?;

    let outcome = commit_changes(
        root,
        &config,
        &mut state,
        CommitRequest {
            paths: files,
            message,
        },
    )?;

    if json {
        print_json(&outcome)?;
    } else {
        println!("[{}] {}", outcome.sha, first_line(&outcome.message));
        for file in &outcome.files {
            println!("  {} {}", file.kind.letter(), file.path);
        }
    }
    Ok(())
}

/// Commit and persist the ledger entry. Shared with `--commit` on the
/// consuming steps.
pub fn commit_changes(
    root: &Path,
    config: &Config,
    state: &mut State,
    request: CommitRequest,
) -> anyhow::Result<CommitOutcome> {
    let git = Git::open(root).context("cannot commit")?;
    let outcome = commit::commit(&git, config, state, request).context("commit failed")?;
    state.save(root).context("failed to save state")?;
    Ok(outcome)
}
