//! Runs an artifact's validation commands through the shell.

use crate::error::{HandoffError, Result};
use serde::Serialize;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub command: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub results: Vec<CommandResult>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    pub fn first_failure(&self) -> Option<&CommandResult> {
        self.results.iter().find(|r| !r.passed)
    }

    /// `Err(ValidationFailed)` naming the first failing command.
    pub fn into_result(self) -> Result<Self> {
        match self.first_failure() {
            Some(failed) => Err(HandoffError::ValidationFailed(match failed.exit_code {
                Some(code) => format!("`{}` exited with {code}", failed.command),
                None => format!("`{}` was terminated", failed.command),
            })),
            None => Ok(self),
        }
    }
}

/// Run `commands` in order with `sh -c` from `root`, stopping at the first
/// failure. Child output goes straight to the terminal.
pub fn run_commands(root: &Path, commands: &[String]) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();
    for command in commands {
        tracing::debug!(command = %command, "running validation");
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(root)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => HandoffError::ToolMissing("sh".to_string()),
                _ => HandoffError::Io(e),
            })?;
        let passed = status.success();
        report.results.push(CommandResult {
            command: command.clone(),
            passed,
            exit_code: status.code(),
        });
        if !passed {
            tracing::warn!(command = %command, code = ?status.code(), "validation failed");
            break;
        }
    }
    Ok(report)
}
