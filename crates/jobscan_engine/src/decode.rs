use jobscan_core::{
    AuthRequirement, ClassifiedRecord, JobOutcome, JobStatus, StartReply, Verdict,
};
use jobscan_logging::jobscan_warn;
use serde::Deserialize;
use serde_json::Value;

use crate::{BackendError, FailureKind};

/// Every field the start and status endpoints are known to send.
#[derive(Debug, Default, Deserialize)]
struct RawReply {
    #[serde(default)]
    auth_url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    job_emails: Option<RawJobEmails>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawJobEmails {
    /// Entries are classifier output and are converted one by one.
    Records(Vec<Value>),
    Message { message: String },
}

impl From<RawJobEmails> for JobOutcome {
    fn from(raw: RawJobEmails) -> Self {
        match raw {
            RawJobEmails::Records(entries) => {
                let total = entries.len();
                let records: Vec<ClassifiedRecord> =
                    entries.into_iter().filter_map(record_from_value).collect();
                if records.len() < total {
                    jobscan_warn!(
                        "Skipped {} of {} job_emails entries that were not objects",
                        total - records.len(),
                        total
                    );
                }
                JobOutcome::Records(records)
            }
            RawJobEmails::Message { message } => JobOutcome::Empty { message },
        }
    }
}

/// Scalars become text and anything unusable becomes empty or `Unknown`.
/// Entries that are not objects are dropped.
fn record_from_value(entry: Value) -> Option<ClassifiedRecord> {
    let Value::Object(mut fields) = entry else {
        return None;
    };
    let company_name = fields.remove("company_name").map(scalar_text);
    let date = fields.remove("date").map(scalar_text);
    let verdict = match fields.remove("verdict") {
        Some(Value::String(tag)) => Verdict::from(tag),
        _ => Verdict::Unknown,
    };
    Some(ClassifiedRecord::new(
        company_name.unwrap_or_default(),
        date.unwrap_or_default(),
        verdict,
    ))
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusTag {
    Running(bool),
    Done,
    Error,
    Other,
}

fn status_tag(status: Option<&str>) -> Option<StatusTag> {
    let status = status?.trim().to_ascii_lowercase();
    Some(match status.as_str() {
        "started" => StatusTag::Running(true),
        "processing" => StatusTag::Running(false),
        "done" => StatusTag::Done,
        "error" => StatusTag::Error,
        _ => StatusTag::Other,
    })
}

fn parse(bytes: &[u8]) -> Result<RawReply, BackendError> {
    serde_json::from_slice(bytes)
        .map_err(|err| BackendError::new(FailureKind::Decode, format!("invalid reply body: {err}")))
}

fn running(started: bool) -> JobStatus {
    if started {
        JobStatus::Started
    } else {
        JobStatus::Processing
    }
}

/// Decode the start endpoint's reply. Checked in order: authorization link,
/// async-started marker, immediate result, reported error.
pub fn decode_start_reply(bytes: &[u8]) -> Result<StartReply, BackendError> {
    let raw = parse(bytes)?;

    if let Some(url) = raw.auth_url.filter(|url| !url.trim().is_empty()) {
        return Ok(StartReply::AuthRequired(AuthRequirement {
            authorization_url: url,
        }));
    }

    let tag = status_tag(raw.status.as_deref());
    if let Some(StatusTag::Running(started)) = tag {
        return Ok(StartReply::Status(running(started)));
    }
    if let Some(emails) = raw.job_emails {
        return Ok(StartReply::Status(JobStatus::Done(emails.into())));
    }
    if tag == Some(StatusTag::Error) {
        return Ok(StartReply::Status(JobStatus::Error));
    }

    Err(unrecognized(raw.status.as_deref()))
}

/// Decode one status poll reply.
pub fn decode_status(bytes: &[u8]) -> Result<JobStatus, BackendError> {
    let raw = parse(bytes)?;

    match status_tag(raw.status.as_deref()) {
        Some(StatusTag::Running(started)) => Ok(running(started)),
        Some(StatusTag::Error) => Ok(JobStatus::Error),
        Some(StatusTag::Done) => match raw.job_emails {
            Some(emails) => Ok(JobStatus::Done(emails.into())),
            None => Err(BackendError::new(
                FailureKind::Decode,
                "status done without job_emails",
            )),
        },
        // Older backends answer with the bare result.
        None => match raw.job_emails {
            Some(emails) => Ok(JobStatus::Done(emails.into())),
            None => Err(unrecognized(None)),
        },
        Some(StatusTag::Other) => Err(unrecognized(raw.status.as_deref())),
    }
}

fn unrecognized(status: Option<&str>) -> BackendError {
    let message = match status {
        Some(status) => format!("unrecognized status {status:?}"),
        None => "reply has no recognizable fields".to_string(),
    };
    BackendError::new(FailureKind::Decode, message)
}
