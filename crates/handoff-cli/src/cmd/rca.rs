use super::{load_config, load_state};
use crate::output::print_json;
use anyhow::Context;
use handoff_core::{
    rca::Rca,
    state::Outcome,
    tracker::GhTracker,
    types::{IssueId, Step},
};
use std::path::Path;

pub fn run(root: &Path, issue: &str, json: bool) -> anyhow::Result<()> {
    let issue = IssueId::parse(issue)?;
    let config = load_config(root)?;
    let mut state = load_state(root)?;

    let tracker = GhTracker::new(&config.tracker.command, root);
    let rca = Rca::create(root, &config, issue, &tracker)
        .with_context(|| format!("cannot analyze issue #{issue}"))?;

    let subject = issue.to_string();
    state.record_step(
        Step::Rca,
        Some(&subject),
        Outcome::Completed,
        Some(&rca.path),
        Some(&rca.title),
    );
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&rca)?;
    } else {
        println!("Created {}: {}", rca.path, rca.title);
        if !rca.url.is_empty() {
            println!("Issue: {}", rca.url);
        }
        println!("Fill in the analysis, then run: handoff implement-fix {issue}");
    }
    Ok(())
}
