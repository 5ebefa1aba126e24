use serde::{Deserialize, Deserializer, Serialize};

use crate::{JobError, Verdict};

/// Identifies one start action. Replies and poll ticks carry the ticket they
/// were issued under so late arrivals from a superseded job can be dropped.
pub type JobTicket = u64;

/// Upper bound on the messages requested per start call.
pub const MAX_SCAN_LIMIT: u32 = 300;

/// Inbox to scan and how many messages to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    user_email: String,
    limit: u32,
}

impl JobRequest {
    /// Trims the email and rejects blank input. The limit is clamped to
    /// `1..=MAX_SCAN_LIMIT`.
    pub fn new(user_email: &str, limit: u32) -> Result<Self, JobError> {
        let trimmed = user_email.trim();
        if trimmed.is_empty() {
            return Err(JobError::Validation);
        }
        Ok(Self {
            user_email: trimmed.to_string(),
            limit: limit.clamp(1, MAX_SCAN_LIMIT),
        })
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequirement {
    pub authorization_url: String,
}

/// One classified email as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default = "unknown_verdict", deserialize_with = "null_as_unknown")]
    pub verdict: Verdict,
}

impl ClassifiedRecord {
    pub fn new(company_name: impl Into<String>, date: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            company_name: company_name.into(),
            date: date.into(),
            verdict,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<Verdict, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Verdict::from)
        .unwrap_or(Verdict::Unknown))
}

fn unknown_verdict() -> Verdict {
    Verdict::Unknown
}

/// The two ways a job can finish successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Classified records; may be empty when nothing matched.
    Records(Vec<ClassifiedRecord>),
    /// The backend explicitly reported there is nothing to show.
    Empty { message: String },
}

impl JobOutcome {
    pub fn records(&self) -> &[ClassifiedRecord] {
        match self {
            JobOutcome::Records(records) => records,
            JobOutcome::Empty { .. } => &[],
        }
    }

    pub fn empty_message(&self) -> Option<&str> {
        match self {
            JobOutcome::Records(_) => None,
            JobOutcome::Empty { message } => Some(message),
        }
    }
}

/// Lifecycle signal reported by both the start and the status endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Started,
    Processing,
    Done(JobOutcome),
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done(_) | JobStatus::Error)
    }
}

/// Decoded reply to the start call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartReply {
    AuthRequired(AuthRequirement),
    Status(JobStatus),
}
