//! Where each artifact sits in its pipeline, derived from artifacts on disk
//! and the ledger.

use crate::artifact::ArtifactKind;
use crate::config::Config;
use crate::error::Result;
use crate::plan::Plan;
use crate::rca::Rca;
use crate::state::{Outcome, State};
use crate::types::Step;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Planned,
    Analyzed,
    ValidationFailed,
    Executed,
    Fixed,
    Committed,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Planned => "planned",
            Position::Analyzed => "analyzed",
            Position::ValidationFailed => "validation_failed",
            Position::Executed => "executed",
            Position::Fixed => "fixed",
            Position::Committed => "committed",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusRow {
    pub kind: ArtifactKind,
    pub subject: String,
    pub title: String,
    pub path: String,
    pub position: Position,
    /// The command that moves this artifact forward, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Every plan and RCA with its pipeline position, plans first.
pub fn status(root: &Path, config: &Config, state: &State) -> Result<Vec<StatusRow>> {
    let mut rows = Vec::new();
    for plan in Plan::list(root, config)? {
        let subject = plan.feature.to_string();
        let consumer = ArtifactKind::Plan.consumer();
        let position = position_for(
            state,
            consumer,
            &subject,
            Position::Planned,
            Position::Executed,
        );
        rows.push(StatusRow {
            kind: ArtifactKind::Plan,
            next: next_command(position, consumer, &subject),
            subject,
            title: plan.title,
            path: plan.path,
            position,
        });
    }
    for rca in Rca::list(root, config)? {
        let subject = rca.issue.to_string();
        let consumer = ArtifactKind::Rca.consumer();
        let position = position_for(
            state,
            consumer,
            &subject,
            Position::Analyzed,
            Position::Fixed,
        );
        rows.push(StatusRow {
            kind: ArtifactKind::Rca,
            next: next_command(position, consumer, &subject),
            subject,
            title: rca.title,
            path: rca.path,
            position,
        });
    }
    Ok(rows)
}

fn position_for(
    state: &State,
    consumer: Step,
    subject: &str,
    produced: Position,
    consumed: Position,
) -> Position {
    match state.last_for(consumer, subject) {
        None => produced,
        Some((_, entry)) if entry.outcome == Outcome::ValidationFailed => {
            Position::ValidationFailed
        }
        Some((index, _)) if state.committed_after(index) => Position::Committed,
        Some(_) => consumed,
    }
}

fn next_command(position: Position, consumer: Step, subject: &str) -> Option<String> {
    match position {
        Position::Planned | Position::Analyzed | Position::ValidationFailed => {
            Some(format!("handoff {consumer} {subject}"))
        }
        Position::Executed | Position::Fixed => {
            consumer.hands_off_to().map(|next| format!("handoff {next}"))
        }
        Position::Committed => None,
    }
}
