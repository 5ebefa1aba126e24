use crate::{JobRequest, JobTicket};

/// Side effects requested by [`crate::update`]; the runtime executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue one health probe.
    ProbeHealth,
    /// Arm the one-shot liveness retry timer.
    ScheduleHealthRetry,
    /// Disarm the liveness retry timer, if armed.
    CancelHealthRetry,
    /// Backend just became reachable; fire the on-online callback.
    BackendOnline,
    /// Issue the start call.
    StartJob { ticket: JobTicket, request: JobRequest },
    /// Begin the repeating status poll for `user_email`.
    ActivatePoller { ticket: JobTicket, user_email: String },
    /// Stop the repeating status poll, if any.
    DeactivatePoller,
    /// Hand the authorization URL to the host opener.
    OpenUrl { url: String },
}
