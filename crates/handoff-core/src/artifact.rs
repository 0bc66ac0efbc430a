use crate::error::{HandoffError, Result};
use crate::markdown;
use crate::types::Step;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Plan,
    Rca,
}

impl ArtifactKind {
    /// The step that owns (creates) artifacts of this kind.
    pub fn producer(self) -> Step {
        match self {
            ArtifactKind::Plan => Step::Planning,
            ArtifactKind::Rca => Step::Rca,
        }
    }

    /// The step that reads artifacts of this kind.
    pub fn consumer(self) -> Step {
        match self {
            ArtifactKind::Plan => Step::Execute,
            ArtifactKind::Rca => Step::ImplementFix,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::Plan => "plan",
            ArtifactKind::Rca => "rca",
        })
    }
}

/// An artifact as read from disk: parsed front matter (if any) plus body.
#[derive(Debug, Clone)]
pub struct RawArtifact<M> {
    pub meta: Option<M>,
    pub body: String,
}

/// Read an artifact written by a producer step or by hand.
///
/// Documents without front matter are accepted with `meta: None`; documents
/// with front matter that does not parse are rejected.
pub fn read<M: DeserializeOwned>(path: &Path, rel: &str) -> Result<RawArtifact<M>> {
    let text = std::fs::read_to_string(path)?;
    match markdown::split_front_matter(&text) {
        Some((yaml, body)) => {
            let meta: M =
                serde_yaml::from_str(yaml).map_err(|e| HandoffError::MalformedArtifact {
                    path: rel.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(RawArtifact {
                meta: Some(meta),
                body: body.to_string(),
            })
        }
        None => Ok(RawArtifact {
            meta: None,
            body: text,
        }),
    }
}

/// Title from the first `# ` heading of a body, with any `Prefix:` removed.
pub fn heading_title(body: &str, prefix: &str) -> Option<String> {
    let line = body.lines().find_map(|l| l.strip_prefix("# "))?;
    let title = line
        .trim()
        .strip_prefix(prefix)
        .map(str::trim)
        .unwrap_or(line.trim());
    (!title.is_empty()).then(|| title.to_string())
}
