use super::{load_config, load_state};
use crate::output::print_json;
use anyhow::Context;
use handoff_core::{context::ContextSummary, state::Outcome, types::Step};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let mut state = load_state(root)?;

    let summary = ContextSummary::load(root, &config, &state)
        .with_context(|| format!("cannot read {}", root.display()))?;

    state.record_step(Step::Prime, None, Outcome::Completed, None, None);
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&summary)?;
    } else {
        print!("{}", summary.render());
    }
    Ok(())
}
