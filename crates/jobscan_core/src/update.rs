use jobscan_logging::{jobscan_debug, jobscan_info, jobscan_warn};

use crate::liveness::LivenessAction;
use crate::state::StartNotice;
use crate::{
    AppState, Effect, JobError, JobPhase, JobRequest, JobStatus, JobTicket, Msg, StartReply,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_disposed() {
        jobscan_debug!("Ignoring {:?} after dispose", msg);
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::Activated => {
            let actions = state.liveness_mut().activate();
            liveness_effects(actions)
        }
        Msg::EmailChanged(email) => {
            state.set_email_input(email);
            Vec::new()
        }
        Msg::StartClicked => start(&mut state),
        Msg::OpenAuthClicked => match state.phase() {
            JobPhase::AwaitingAuth(auth) => {
                let url = auth.authorization_url.clone();
                jobscan_info!("Handing authorization link to host opener");
                state.set_phase(JobPhase::Idle);
                state.set_notice(Some(StartNotice::AuthLinkOpened));
                vec![Effect::OpenUrl { url }]
            }
            _ => Vec::new(),
        },
        Msg::FilterSelected(filter) => {
            state.set_filter(filter);
            Vec::new()
        }
        Msg::RetryHealthClicked => {
            let actions = state.liveness_mut().retry_now();
            liveness_effects(actions)
        }
        Msg::HealthProbed(result) => {
            let actions = match result {
                Ok(()) => {
                    jobscan_info!("Backend online");
                    state.liveness_mut().probe_succeeded()
                }
                Err(err) => {
                    jobscan_warn!(
                        "Health probe failed ({}): {}; attempt {}",
                        err.kind(),
                        err,
                        state.liveness().attempt()
                    );
                    state.liveness_mut().probe_failed()
                }
            };
            if state.liveness().is_online()
                && matches!(state.notice(), Some(StartNotice::BackendOffline))
            {
                state.set_notice(None);
            }
            liveness_effects(actions)
        }
        Msg::HealthRetryElapsed => {
            let actions = state.liveness_mut().retry_elapsed();
            liveness_effects(actions)
        }
        Msg::StartResponded { ticket, result } => apply_start_reply(&mut state, ticket, result),
        Msg::PollTicked { ticket, result } => apply_poll_tick(&mut state, ticket, result),
        Msg::Disposed => {
            let mut effects = vec![Effect::DeactivatePoller];
            let actions = state.liveness_mut().teardown();
            effects.extend(liveness_effects(actions));
            state.mark_disposed();
            effects
        }
    };

    (state, effects)
}

fn start(state: &mut AppState) -> Vec<Effect> {
    let request = match JobRequest::new(state.email_input(), state.settings().scan_limit) {
        Ok(request) => request,
        Err(err) => {
            jobscan_debug!("Start rejected: {}", err);
            state.set_notice(Some(StartNotice::Invalid(err)));
            return Vec::new();
        }
    };
    if state.phase().is_busy() {
        jobscan_debug!("Start ignored; job already {}", state.phase().name());
        return Vec::new();
    }
    if !state.liveness().is_online() {
        jobscan_debug!("Start ignored; backend not online");
        state.set_notice(Some(StartNotice::BackendOffline));
        return Vec::new();
    }

    let ticket = state.begin_job(request.user_email());
    jobscan_info!(
        "Starting job ticket={} email_len={} limit={}",
        ticket,
        request.user_email().len(),
        request.limit()
    );
    vec![
        Effect::DeactivatePoller,
        Effect::StartJob { ticket, request },
    ]
}

fn apply_start_reply(
    state: &mut AppState,
    ticket: JobTicket,
    result: Result<StartReply, JobError>,
) -> Vec<Effect> {
    if ticket != state.ticket() || *state.phase() != JobPhase::Starting {
        jobscan_debug!(
            "Discarding start reply for ticket {} (current {}, phase {})",
            ticket,
            state.ticket(),
            state.phase().name()
        );
        return Vec::new();
    }

    match result {
        Ok(StartReply::AuthRequired(auth)) => {
            jobscan_info!("Backend needs authorization before ticket {} can run", ticket);
            state.set_phase(JobPhase::AwaitingAuth(auth));
            Vec::new()
        }
        Ok(StartReply::Status(JobStatus::Started | JobStatus::Processing)) => {
            jobscan_info!("Job ticket={} accepted; polling", ticket);
            state.set_phase(JobPhase::Processing);
            let user_email = state.job_email().to_string();
            vec![Effect::ActivatePoller { ticket, user_email }]
        }
        Ok(StartReply::Status(JobStatus::Done(outcome))) => {
            jobscan_info!(
                "Job ticket={} finished immediately with {} records",
                ticket,
                outcome.records().len()
            );
            state.set_phase(JobPhase::Done(outcome));
            Vec::new()
        }
        Ok(StartReply::Status(JobStatus::Error)) => {
            jobscan_warn!("Backend refused job ticket={}", ticket);
            state.set_phase(JobPhase::Error(JobError::BackendReported));
            Vec::new()
        }
        Err(err) => {
            jobscan_warn!("Start failed ({}): {}", err.kind(), err);
            state.set_phase(JobPhase::Error(err));
            Vec::new()
        }
    }
}

fn apply_poll_tick(
    state: &mut AppState,
    ticket: JobTicket,
    result: Result<JobStatus, JobError>,
) -> Vec<Effect> {
    if ticket != state.ticket() || *state.phase() != JobPhase::Processing {
        jobscan_debug!(
            "Discarding poll tick for ticket {} (current {}, phase {})",
            ticket,
            state.ticket(),
            state.phase().name()
        );
        return Vec::new();
    }

    match result {
        Ok(JobStatus::Started | JobStatus::Processing) => {
            state.record_poll_tick();
            jobscan_debug!(
                "Job ticket={} still processing after {} checks",
                ticket,
                state.poll_ticks()
            );
            Vec::new()
        }
        Ok(JobStatus::Done(outcome)) => {
            state.record_poll_tick();
            jobscan_info!(
                "Job ticket={} done with {} records",
                ticket,
                outcome.records().len()
            );
            state.set_phase(JobPhase::Done(outcome));
            vec![Effect::DeactivatePoller]
        }
        Ok(JobStatus::Error) => {
            state.record_poll_tick();
            jobscan_warn!("Backend reported job ticket={} failed", ticket);
            state.set_phase(JobPhase::Error(JobError::BackendReported));
            vec![Effect::DeactivatePoller]
        }
        Err(err) => {
            let exhausted = state.record_poll_failure();
            jobscan_warn!(
                "Poll failed ({}): {}; {} consecutive",
                err.kind(),
                err,
                state.poll_failures()
            );
            if exhausted {
                jobscan_warn!("Giving up on job ticket={} after repeated poll failures", ticket);
                state.set_phase(JobPhase::Error(err));
                vec![Effect::DeactivatePoller]
            } else {
                Vec::new()
            }
        }
    }
}

fn liveness_effects(actions: Vec<LivenessAction>) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(actions.len() + 1);
    for action in actions {
        match action {
            LivenessAction::Probe => effects.push(Effect::ProbeHealth),
            LivenessAction::ScheduleRetry => effects.push(Effect::ScheduleHealthRetry),
            LivenessAction::CancelRetry => effects.push(Effect::CancelHealthRetry),
            LivenessAction::CancelRetryAndProbe => {
                effects.push(Effect::CancelHealthRetry);
                effects.push(Effect::ProbeHealth);
            }
            LivenessAction::WentOnline => effects.push(Effect::BackendOnline),
        }
    }
    effects
}
