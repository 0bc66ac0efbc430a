use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    #[error("invalid feature name '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidFeatureName(String),

    #[error("invalid issue id '{0}': must be a positive integer")]
    InvalidIssueId(String),

    #[error("unknown step '{0}': expected one of prime, planning, execute, commit, rca, implement-fix")]
    UnknownStep(String),

    #[error("plan not found: {0} (run 'handoff planning {0}' first)")]
    PlanNotFound(String),

    #[error("RCA not found for issue #{0} (run 'handoff rca {0}' first)")]
    RcaNotFound(u64),

    #[error("artifact already exists: {0}")]
    ArtifactExists(String),

    #[error("malformed artifact {path}: {reason}")]
    MalformedArtifact { path: String, reason: String },

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("repository has unresolved conflicts: {}", .0.join(", "))]
    Conflicted(Vec<String>),

    #[error("not a git repository: {0}")]
    NotARepository(String),

    #[error("issue tracker is not authenticated: {0}")]
    TrackerUnauthenticated(String),

    #[error("issue not found: #{0}")]
    IssueNotFound(u64),

    #[error("required tool not found: {0}")]
    ToolMissing(String),

    #[error("{program} {args} failed: {stderr}")]
    CommandFailed {
        program: String,
        args: String,
        stderr: String,
    },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HandoffError>;
