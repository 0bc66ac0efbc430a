use super::{load_config, load_state};
use crate::output::print_json;
use anyhow::Context;
use handoff_core::{
    plan::{Plan, PlanDraft},
    state::Outcome,
    types::{FeatureName, Step},
};
use std::path::Path;

pub struct PlanningArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tasks: Vec<String>,
    pub validation: Vec<String>,
}

pub fn run(root: &Path, feature: &str, args: PlanningArgs, json: bool) -> anyhow::Result<()> {
    let feature = FeatureName::parse(feature)?;
    let config = load_config(root)?;
    let mut state = load_state(root)?;

    let draft = PlanDraft {
        title: args.title,
        description: args.description,
        tasks: args.tasks,
        validation: args.validation,
    };
    let plan = Plan::create(root, &config, &feature, draft)
        .with_context(|| format!("cannot plan '{feature}'"))?;

    state.record_step(
        Step::Planning,
        Some(feature.as_str()),
        Outcome::Completed,
        Some(&plan.path),
        Some(&plan.title),
    );
    state.save(root).context("failed to save state")?;

    if json {
        print_json(&plan)?;
    } else {
        println!("Created {}: {}", plan.path, plan.title);
        if plan.tasks.is_empty() {
            println!(
                "Fill in the tasks and validation commands, then run: handoff execute {feature}"
            );
        } else {
            println!("{} task(s). Next: handoff execute {feature}", plan.tasks.len());
        }
    }
    Ok(())
}
