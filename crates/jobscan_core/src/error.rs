use thiserror::Error;

/// Failure taxonomy surfaced by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("user email must not be empty")]
    Validation,
    #[error("network error: {0}")]
    Network(String),
    #[error("unrecognized backend response: {0}")]
    Protocol(String),
    #[error("backend reported the job failed")]
    BackendReported,
}

impl JobError {
    /// Short tag used in log lines so connectivity and parse failures stay
    /// distinguishable.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Validation => "validation",
            JobError::Network(_) => "network",
            JobError::Protocol(_) => "protocol",
            JobError::BackendReported => "backend",
        }
    }
}
