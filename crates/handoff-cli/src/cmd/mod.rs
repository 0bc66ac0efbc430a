pub mod commit;
pub mod execute;
pub mod implement_fix;
pub mod init;
pub mod planning;
pub mod prime;
pub mod prompt;
pub mod rca;
pub mod status;

use anyhow::Context;
use handoff_core::{
    commit::{CommitOutcome, CommitRequest},
    config::Config,
    state::{Outcome, State},
    types::Step,
    validate::{self, ValidationReport},
};
use serde::Serialize;
use std::path::Path;

/// Flags shared by the two consuming steps, `execute` and `implement-fix`.
#[derive(Debug, Clone, Copy, Default, clap::Args)]
pub struct StepOpts {
    /// Run the artifact's validation commands, stopping at the first failure
    #[arg(long)]
    pub validate: bool,

    /// Commit the changes once the step succeeds
    #[arg(long, conflicts_with = "dry_run")]
    pub commit: bool,

    /// Show the artifact without recording the step
    #[arg(long)]
    pub dry_run: bool,
}

/// What happened after a consuming step loaded its artifact.
#[derive(Debug, Serialize)]
pub struct StepReport {
    /// `None` for a dry run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitOutcome>,
}

/// The artifact a consuming step works from.
pub struct Consumed<'a> {
    pub step: Step,
    pub subject: &'a str,
    pub title: &'a str,
    pub artifact: &'a str,
    pub validation: &'a [String],
}

/// Validate, record, and optionally commit on behalf of `execute` and
/// `implement-fix`. A failed validation is recorded before it is returned.
pub fn finish_consuming_step(
    root: &Path,
    config: &Config,
    consumed: Consumed<'_>,
    opts: StepOpts,
) -> anyhow::Result<StepReport> {
    let Consumed {
        step,
        subject,
        title,
        artifact,
        validation,
    } = consumed;

    let report = if opts.validate {
        if validation.is_empty() {
            tracing::warn!(%step, subject, "no validation commands to run");
        }
        Some(validate::run_commands(root, validation).context("failed to run validation")?)
    } else {
        None
    };
    let passed = report.as_ref().map_or(true, ValidationReport::passed);
    let outcome = if passed {
        Outcome::Completed
    } else {
        Outcome::ValidationFailed
    };

    let mut state = load_state(root)?;
    if !opts.dry_run {
        state.record_step(step, Some(subject), outcome, Some(artifact), Some(title));
        state.save(root).context("failed to save state")?;
    }

    if let Some(report) = &report {
        report
            .clone()
            .into_result()
            .with_context(|| format!("{step} {subject}"))?;
    }

    let commit = if opts.commit {
        Some(commit::commit_changes(
            root,
            config,
            &mut state,
            CommitRequest::default(),
        )?)
    } else {
        None
    };

    Ok(StepReport {
        outcome: (!opts.dry_run).then_some(outcome),
        validation: report,
        commit,
    })
}

pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).context("failed to load config.yaml")
}

pub fn load_state(root: &Path) -> anyhow::Result<State> {
    State::load(root).context("failed to load state.yaml")
}

pub fn print_list(heading: &str, items: &[String], numbered: bool) {
    println!("{heading}:");
    if items.is_empty() {
        println!("  (none)");
    }
    for (i, item) in items.iter().enumerate() {
        if numbered {
            println!("  {}. {item}", i + 1);
        } else {
            println!("  {item}");
        }
    }
}

/// Text summary of a `StepReport`, ending with the next command to run.
pub fn print_step_report(step: Step, subject: &str, report: &StepReport) {
    if let Some(validation) = &report.validation {
        println!();
        for result in &validation.results {
            let mark = if result.passed { "ok  " } else { "FAIL" };
            println!("  {mark}  {}", result.command);
        }
        println!(
            "Validation passed ({} command(s))",
            validation.results.len()
        );
    }

    println!();
    match report.outcome {
        Some(_) => println!("Recorded {step} for '{subject}'"),
        None => println!("Dry run: nothing recorded"),
    }

    match &report.commit {
        Some(c) => println!("Committed {}: {}", c.sha, first_line(&c.message)),
        None if report.outcome.is_some() => {
            if let Some(next) = step.hands_off_to() {
                println!("Next: handoff {next}");
            }
        }
        None => {}
    }
}

pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or_default()
}
