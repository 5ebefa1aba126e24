use crate::{FilterSelection, JobError, JobStatus, JobTicket, StartReply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Session created; begin liveness probing.
    Activated,
    /// User edited the email input.
    EmailChanged(String),
    /// User asked to scan the inbox for the current email.
    StartClicked,
    /// User chose to open the pending authorization link.
    OpenAuthClicked,
    /// User picked a result filter.
    FilterSelected(FilterSelection),
    /// User asked to re-check the backend right away.
    RetryHealthClicked,
    /// Health probe finished.
    HealthProbed(Result<(), JobError>),
    /// The liveness retry delay ran out.
    HealthRetryElapsed,
    /// Start call finished.
    StartResponded {
        ticket: JobTicket,
        result: Result<StartReply, JobError>,
    },
    /// One status poll finished.
    PollTicked {
        ticket: JobTicket,
        result: Result<JobStatus, JobError>,
    },
    /// Session is being torn down.
    Disposed,
}
