//! Jobscan core: pure job orchestration state machine and view-model helpers.
mod effect;
mod error;
mod job;
mod liveness;
mod msg;
mod present;
mod state;
mod update;
mod verdict;
mod view_model;

pub use effect::Effect;
pub use error::JobError;
pub use job::{
    AuthRequirement, ClassifiedRecord, JobOutcome, JobRequest, JobStatus, JobTicket, StartReply,
    MAX_SCAN_LIMIT,
};
pub use liveness::{Liveness, LivenessState};
pub use msg::Msg;
pub use present::{present, present_with, FilterSelection, PositivePolicy};
pub use state::{
    AppState, CoreSettings, JobPhase, StartNotice, DEFAULT_MAX_POLL_FAILURES, DEFAULT_SCAN_LIMIT,
};
pub use update::update;
pub use verdict::Verdict;
pub use view_model::{AppViewModel, PhaseView, RecordRowView};
