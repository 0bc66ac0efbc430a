use super::{finish_consuming_step, load_config, print_list, print_step_report, Consumed, StepOpts};
use crate::output::print_json;
use anyhow::Context;
use handoff_core::{
    plan::Plan,
    types::{FeatureName, Step},
};
use std::path::Path;

pub fn run(root: &Path, feature: &str, opts: StepOpts, json: bool) -> anyhow::Result<()> {
    let feature = FeatureName::parse(feature)?;
    let config = load_config(root)?;
    let plan = Plan::load(root, &config, &feature)
        .with_context(|| format!("cannot execute '{feature}'"))?;
    let validation = plan.validation_or(&config);

    if !json {
        println!("Plan: {} ({})", plan.title, plan.path);
        println!();
        print_list("Tasks", &plan.tasks, true);
        println!();
        print_list("Validation commands", validation, false);
    }

    let subject = feature.to_string();
    let report = finish_consuming_step(
        root,
        &config,
        Consumed {
            step: Step::Execute,
            subject: &subject,
            title: &plan.title,
            artifact: &plan.path,
            validation,
        },
        opts,
    )?;

    if json {
        print_json(&serde_json::json!({
            "feature": subject,
            "plan": plan,
            "validation_commands": validation,
            "report": report,
        }))?;
    } else {
        print_step_report(Step::Execute, &subject, &report);
    }
    Ok(())
}
