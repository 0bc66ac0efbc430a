use crate::error::{HandoffError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Prime,
    Planning,
    Execute,
    Commit,
    Rca,
    ImplementFix,
}

impl Step {
    pub fn all() -> &'static [Step] {
        &[
            Step::Prime,
            Step::Planning,
            Step::Execute,
            Step::Commit,
            Step::Rca,
            Step::ImplementFix,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Prime => "prime",
            Step::Planning => "planning",
            Step::Execute => "execute",
            Step::Commit => "commit",
            Step::Rca => "rca",
            Step::ImplementFix => "implement-fix",
        }
    }

    /// Human name of the role this step plays in the pipeline.
    pub fn role(self) -> &'static str {
        match self {
            Step::Prime => "Context Loader",
            Step::Planning => "Planner",
            Step::Execute => "Executor",
            Step::Commit => "Committer",
            Step::Rca => "Root-Cause Analyzer",
            Step::ImplementFix => "Fix Implementer",
        }
    }

    /// Placeholder shown in usage text for the step's argument, if any.
    pub fn argument_hint(self) -> Option<&'static str> {
        match self {
            Step::Prime => None,
            Step::Planning | Step::Execute => Some("<feature>"),
            Step::Commit => Some("[files...]"),
            Step::Rca | Step::ImplementFix => Some("<issue-id>"),
        }
    }

    /// The step that consumes this step's output, if the pipeline continues.
    pub fn hands_off_to(self) -> Option<Step> {
        match self {
            Step::Planning => Some(Step::Execute),
            Step::Execute => Some(Step::Commit),
            Step::Rca => Some(Step::ImplementFix),
            Step::ImplementFix => Some(Step::Commit),
            Step::Prime | Step::Commit => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = HandoffError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "prime" => Ok(Step::Prime),
            "planning" | "plan" => Ok(Step::Planning),
            "execute" => Ok(Step::Execute),
            "commit" => Ok(Step::Commit),
            "rca" => Ok(Step::Rca),
            "implement-fix" | "implement_fix" => Ok(Step::ImplementFix),
            other => Err(HandoffError::UnknownStep(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// FeatureName
// ---------------------------------------------------------------------------

static FEATURE_RE: OnceLock<Regex> = OnceLock::new();

fn feature_re() -> &'static Regex {
    FEATURE_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").expect("static regex")
    })
}

/// User-chosen name scoping a plan and its execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureName(String);

impl FeatureName {
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(HandoffError::EmptyIdentifier("feature name"));
        }
        if name.len() > 64 || !feature_re().is_match(name) {
            return Err(HandoffError::InvalidFeatureName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// "auth-login" -> "auth login", used when no title is supplied.
    pub fn default_title(&self) -> String {
        self.0.replace('-', " ")
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FeatureName {
    type Error = HandoffError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FeatureName> for String {
    fn from(value: FeatureName) -> Self {
        value.0
    }
}

// ---------------------------------------------------------------------------
// IssueId
// ---------------------------------------------------------------------------

/// External tracker reference keying an RCA and its fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(u64);

impl IssueId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HandoffError::EmptyIdentifier("issue id"));
        }
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HandoffError::InvalidIssueId(trimmed.to_string()));
        }
        match digits.parse::<u64>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(HandoffError::InvalidIssueId(trimmed.to_string())),
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for IssueId {
    type Err = HandoffError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn step_names_roundtrip() {
        for step in Step::all() {
            assert_eq!(Step::from_str(step.as_str()).unwrap(), *step);
        }
        assert!(Step::from_str("deploy").is_err());
    }

    #[test]
    fn step_yaml_is_kebab_case() {
        let yaml = serde_yaml::to_string(&Step::ImplementFix).unwrap();
        assert_eq!(yaml.trim(), "implement-fix");
    }

    #[test]
    fn handoff_chain() {
        assert_eq!(Step::Planning.hands_off_to(), Some(Step::Execute));
        assert_eq!(Step::Execute.hands_off_to(), Some(Step::Commit));
        assert_eq!(Step::Rca.hands_off_to(), Some(Step::ImplementFix));
        assert_eq!(Step::ImplementFix.hands_off_to(), Some(Step::Commit));
        assert_eq!(Step::Commit.hands_off_to(), None);
    }

    #[test]
    fn valid_feature_names() {
        for name in ["auth-login", "a", "my-feature-123", " x1 "] {
            FeatureName::parse(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_feature_names() {
        assert!(matches!(
            FeatureName::parse("   "),
            Err(HandoffError::EmptyIdentifier(_))
        ));
        for name in ["-dash", "dash-", "has spaces", "UPPER", "a_b", "../escape", "a/b"] {
            assert!(
                matches!(FeatureName::parse(name), Err(HandoffError::InvalidFeatureName(_))),
                "expected invalid: {name}"
            );
        }
    }

    #[test]
    fn issue_ids() {
        assert_eq!(IssueId::parse("42").unwrap().get(), 42);
        assert_eq!(IssueId::parse("#7").unwrap().get(), 7);
        assert!(matches!(IssueId::parse(""), Err(HandoffError::EmptyIdentifier(_))));
        for raw in ["0", "-3", "+5", "#+5", "abc", "#", "12a", "1 2"] {
            assert!(
                matches!(IssueId::parse(raw), Err(HandoffError::InvalidIssueId(_))),
                "expected invalid: {raw}"
            );
        }
    }
}
