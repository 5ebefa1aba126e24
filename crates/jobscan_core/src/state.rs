use crate::view_model::AppViewModel;
use crate::{
    AuthRequirement, FilterSelection, JobError, JobOutcome, JobTicket, Liveness, PositivePolicy,
};

/// Messages requested per start call unless the host overrides it.
pub const DEFAULT_SCAN_LIMIT: u32 = 200;
/// Consecutive failed poll ticks tolerated before the job is marked failed.
pub const DEFAULT_MAX_POLL_FAILURES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    pub scan_limit: u32,
    /// `None` tolerates failed ticks forever.
    pub max_consecutive_poll_failures: Option<u32>,
    pub positive: PositivePolicy,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            scan_limit: DEFAULT_SCAN_LIMIT,
            max_consecutive_poll_failures: Some(DEFAULT_MAX_POLL_FAILURES),
            positive: PositivePolicy::default(),
        }
    }
}

/// Lifecycle of the current job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobPhase {
    #[default]
    Idle,
    /// Start call issued, reply pending.
    Starting,
    AwaitingAuth(AuthRequirement),
    Processing,
    Done(JobOutcome),
    Error(JobError),
}

impl JobPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, JobPhase::Starting | JobPhase::Processing)
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobPhase::Idle => "idle",
            JobPhase::Starting => "starting",
            JobPhase::AwaitingAuth(_) => "awaiting_auth",
            JobPhase::Processing => "processing",
            JobPhase::Done(_) => "done",
            JobPhase::Error(_) => "error",
        }
    }
}

/// Why the last start action did not go out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartNotice {
    Invalid(JobError),
    BackendOffline,
    AuthLinkOpened,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: CoreSettings,
    email_input: String,
    filter: FilterSelection,
    liveness: Liveness,
    phase: JobPhase,
    ticket: JobTicket,
    job_email: String,
    poll_ticks: u32,
    poll_failures: u32,
    notice: Option<StartNotice>,
    disposed: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoreSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::project(self)
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    pub fn email_input(&self) -> &str {
        &self.email_input
    }

    pub fn filter(&self) -> FilterSelection {
        self.filter
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn phase(&self) -> &JobPhase {
        &self.phase
    }

    pub fn ticket(&self) -> JobTicket {
        self.ticket
    }

    /// Trimmed email the current job was started with.
    pub fn job_email(&self) -> &str {
        &self.job_email
    }

    pub fn poll_ticks(&self) -> u32 {
        self.poll_ticks
    }

    pub fn poll_failures(&self) -> u32 {
        self.poll_failures
    }

    pub fn notice(&self) -> Option<&StartNotice> {
        self.notice.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Returns whether anything visible changed since the last call and
    /// clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn liveness_mut(&mut self) -> &mut Liveness {
        self.dirty = true;
        &mut self.liveness
    }

    pub(crate) fn set_email_input(&mut self, email: String) {
        if self.email_input != email {
            self.email_input = email;
            self.dirty = true;
        }
        if matches!(self.notice, Some(StartNotice::Invalid(_))) {
            self.notice = None;
            self.dirty = true;
        }
    }

    pub(crate) fn set_filter(&mut self, filter: FilterSelection) {
        if self.filter != filter {
            self.filter = filter;
            self.dirty = true;
        }
    }

    pub(crate) fn set_notice(&mut self, notice: Option<StartNotice>) {
        if self.notice != notice {
            self.notice = notice;
            self.dirty = true;
        }
    }

    /// Drops the previous job's auth link, results and counters and hands
    /// out a fresh ticket.
    pub(crate) fn begin_job(&mut self, user_email: &str) -> JobTicket {
        self.ticket = self.ticket.wrapping_add(1);
        self.job_email = user_email.to_string();
        self.phase = JobPhase::Starting;
        self.poll_ticks = 0;
        self.poll_failures = 0;
        self.notice = None;
        self.dirty = true;
        self.ticket
    }

    pub(crate) fn set_phase(&mut self, phase: JobPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn record_poll_tick(&mut self) {
        self.poll_ticks = self.poll_ticks.saturating_add(1);
        self.poll_failures = 0;
        self.dirty = true;
    }

    /// Counts a failed tick and reports whether the tolerance is used up.
    pub(crate) fn record_poll_failure(&mut self) -> bool {
        self.poll_failures = self.poll_failures.saturating_add(1);
        self.dirty = true;
        self.settings
            .max_consecutive_poll_failures
            .is_some_and(|max| self.poll_failures >= max.max(1))
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
        self.dirty = true;
    }
}
