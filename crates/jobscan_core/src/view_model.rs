use crate::state::StartNotice;
use crate::{
    present_with, AppState, ClassifiedRecord, FilterSelection, JobPhase, LivenessState, Verdict,
};

/// Coarse phase for rendering; drops the payloads carried by [`JobPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseView {
    #[default]
    Idle,
    Starting,
    AwaitingAuth,
    Processing,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub liveness: LivenessState,
    pub liveness_attempt: u32,
    pub email: String,
    pub can_start: bool,
    pub phase: PhaseView,
    pub status_line: String,
    pub auth_url: Option<String>,
    pub empty_message: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub filter: FilterSelection,
    pub rows: Vec<RecordRowView>,
    pub total_records: usize,
    pub poll_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRowView {
    pub company: String,
    pub date: String,
    pub verdict: Verdict,
    pub label: &'static str,
}

impl From<&ClassifiedRecord> for RecordRowView {
    fn from(record: &ClassifiedRecord) -> Self {
        let company = if record.company_name.trim().is_empty() {
            "Unknown company".to_string()
        } else {
            record.company_name.clone()
        };
        let date = if record.date.trim().is_empty() {
            "Unknown date".to_string()
        } else {
            record.date.clone()
        };
        Self {
            company,
            date,
            verdict: record.verdict.clone(),
            label: record.verdict.label(),
        }
    }
}

impl AppViewModel {
    pub(crate) fn project(state: &AppState) -> Self {
        let phase = state.phase();
        let liveness = state.liveness();
        let filter = state.filter();

        let (auth_url, empty_message, error, records): (
            Option<String>,
            Option<String>,
            Option<String>,
            &[ClassifiedRecord],
        ) = match phase {
            JobPhase::AwaitingAuth(auth) => {
                (Some(auth.authorization_url.clone()), None, None, &[][..])
            }
            JobPhase::Done(outcome) => (
                None,
                outcome.empty_message().map(ToOwned::to_owned),
                None,
                outcome.records(),
            ),
            JobPhase::Error(err) => (None, None, Some(err.to_string()), &[][..]),
            JobPhase::Idle | JobPhase::Starting | JobPhase::Processing => {
                (None, None, None, &[][..])
            }
        };

        let rows = present_with(records, filter, state.settings().positive)
            .iter()
            .map(RecordRowView::from)
            .collect();

        Self {
            liveness: liveness.state(),
            liveness_attempt: liveness.attempt(),
            email: state.email_input().to_string(),
            can_start: liveness.is_online() && !phase.is_busy(),
            phase: phase_view(phase),
            status_line: status_line(state).to_string(),
            auth_url,
            empty_message,
            error,
            notice: state.notice().map(notice_text),
            filter,
            rows,
            total_records: records.len(),
            poll_ticks: state.poll_ticks(),
        }
    }
}

fn phase_view(phase: &JobPhase) -> PhaseView {
    match phase {
        JobPhase::Idle => PhaseView::Idle,
        JobPhase::Starting => PhaseView::Starting,
        JobPhase::AwaitingAuth(_) => PhaseView::AwaitingAuth,
        JobPhase::Processing => PhaseView::Processing,
        JobPhase::Done(_) => PhaseView::Done,
        JobPhase::Error(_) => PhaseView::Error,
    }
}

fn status_line(state: &AppState) -> &'static str {
    match state.phase() {
        JobPhase::Idle => match state.liveness().state() {
            LivenessState::Checking => "Checking backend status…",
            LivenessState::Offline => "Waking up backend…",
            LivenessState::Online => "Ready",
        },
        JobPhase::Starting => "Starting inbox scan…",
        JobPhase::AwaitingAuth(_) => "Sign-in required",
        JobPhase::Processing => "Processing emails…",
        JobPhase::Done(_) => "Done",
        JobPhase::Error(_) => "Something went wrong",
    }
}

fn notice_text(notice: &StartNotice) -> String {
    match notice {
        StartNotice::Invalid(err) => err.to_string(),
        StartNotice::BackendOffline => "Backend is not reachable yet".to_string(),
        StartNotice::AuthLinkOpened => {
            "Finish signing in, then start the scan again".to_string()
        }
    }
}
