use super::{finish_consuming_step, load_config, print_list, print_step_report, Consumed, StepOpts};
use crate::output::print_json;
use anyhow::Context;
use handoff_core::{
    rca::Rca,
    types::{IssueId, Step},
};
use std::path::Path;

pub fn run(root: &Path, issue: &str, opts: StepOpts, json: bool) -> anyhow::Result<()> {
    let issue = IssueId::parse(issue)?;
    let config = load_config(root)?;
    let rca =
        Rca::load(root, &config, issue).with_context(|| format!("cannot fix issue #{issue}"))?;
    let validation = rca.validation_or(&config);

    if !json {
        println!("Issue #{issue}: {} ({})", rca.title, rca.path);
        print_section("Proposed fix", rca.proposed_fix.as_deref());
        print_section("Testing requirements", rca.testing.as_deref());
        println!();
        print_list("Validation commands", validation, false);
    }

    let subject = issue.to_string();
    let report = finish_consuming_step(
        root,
        &config,
        Consumed {
            step: Step::ImplementFix,
            subject: &subject,
            title: &rca.title,
            artifact: &rca.path,
            validation,
        },
        opts,
    )?;

    if json {
        print_json(&serde_json::json!({
            "issue": issue,
            "rca": rca,
            "validation_commands": validation,
            "report": report,
        }))?;
    } else {
        print_step_report(Step::ImplementFix, &subject, &report);
    }
    Ok(())
}

fn print_section(heading: &str, text: Option<&str>) {
    println!();
    println!("{heading}:");
    match text {
        Some(text) => {
            for line in text.lines() {
                println!("  {line}");
            }
        }
        None => println!("  (not filled in yet)"),
    }
}
