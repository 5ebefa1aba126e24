use std::sync::Once;

use jobscan_core::{
    update, AppState, AuthRequirement, ClassifiedRecord, CoreSettings, Effect, FilterSelection,
    JobError, JobOutcome, JobPhase, JobRequest, JobStatus, Msg, PhaseView, StartNotice,
    StartReply, Verdict, DEFAULT_SCAN_LIMIT, MAX_SCAN_LIMIT,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobscan_logging::initialize_for_tests);
}

fn online(state: AppState) -> AppState {
    let (state, _) = update(state, Msg::Activated);
    let (state, _) = update(state, Msg::HealthProbed(Ok(())));
    state
}

fn start_with(state: AppState, email: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::EmailChanged(email.to_string()));
    update(state, Msg::StartClicked)
}

fn reply(state: AppState, result: Result<StartReply, JobError>) -> (AppState, Vec<Effect>) {
    let ticket = state.ticket();
    update(state, Msg::StartResponded { ticket, result })
}

fn tick(state: AppState, result: Result<JobStatus, JobError>) -> (AppState, Vec<Effect>) {
    let ticket = state.ticket();
    update(state, Msg::PollTicked { ticket, result })
}

fn processing_job() -> AppState {
    let state = online(AppState::new());
    let (state, _) = start_with(state, "me@example.com");
    let (state, _) = reply(state, Ok(StartReply::Status(JobStatus::Started)));
    state
}

#[test]
fn start_trims_email_and_requests_fixed_limit() {
    init_logging();
    let state = online(AppState::new());
    let (state, effects) = start_with(state, "  me@example.com \n");

    let expected = JobRequest::new("me@example.com", DEFAULT_SCAN_LIMIT).unwrap();
    assert_eq!(
        effects,
        vec![
            Effect::DeactivatePoller,
            Effect::StartJob {
                ticket: 1,
                request: expected,
            },
        ]
    );
    assert_eq!(state.view().phase, PhaseView::Starting);
    assert_eq!(state.job_email(), "me@example.com");
}

#[test]
fn oversized_scan_limit_is_capped() {
    init_logging();
    let settings = CoreSettings {
        scan_limit: 1_000_000,
        ..CoreSettings::default()
    };
    let state = online(AppState::with_settings(settings));
    let (_, effects) = start_with(state, "me@example.com");

    match effects.as_slice() {
        [Effect::DeactivatePoller, Effect::StartJob { request, .. }] => {
            assert_eq!(request.limit(), MAX_SCAN_LIMIT);
        }
        other => panic!("unexpected effects {other:?}"),
    }
    assert_eq!(JobRequest::new("me@example.com", 0).unwrap().limit(), 1);
}

#[test]
fn blank_email_is_a_validation_error_without_effects() {
    init_logging();
    for blank in ["", "   ", "\t\n"] {
        let state = online(AppState::new());
        let (state, effects) = start_with(state, blank);

        assert!(effects.is_empty());
        assert_eq!(
            state.notice(),
            Some(&StartNotice::Invalid(JobError::Validation))
        );
        assert_eq!(*state.phase(), JobPhase::Idle);
        assert_eq!(state.ticket(), 0);
    }
}

#[test]
fn repeated_start_while_busy_issues_one_request() {
    init_logging();
    let state = online(AppState::new());
    let (state, first) = start_with(state, "me@example.com");
    let (state, second) = update(state, Msg::StartClicked);
    assert_eq!(
        first
            .iter()
            .filter(|e| matches!(e, Effect::StartJob { .. }))
            .count(),
        1
    );
    assert!(second.is_empty());

    let (state, _) = reply(state, Ok(StartReply::Status(JobStatus::Processing)));
    let (_state, third) = update(state, Msg::StartClicked);
    assert!(third.is_empty());
}

#[test]
fn auth_reply_awaits_authorization_without_polling() {
    init_logging();
    let state = online(AppState::new());
    let (state, _) = start_with(state, "me@example.com");
    let url = "https://accounts.example/oauth".to_string();
    let (state, effects) = reply(
        state,
        Ok(StartReply::AuthRequired(AuthRequirement {
            authorization_url: url.clone(),
        })),
    );

    assert!(effects.is_empty());
    assert_eq!(
        *state.phase(),
        JobPhase::AwaitingAuth(AuthRequirement {
            authorization_url: url.clone()
        })
    );
    assert_eq!(state.view().auth_url, Some(url.clone()));

    let (state, effects) = update(state, Msg::OpenAuthClicked);
    assert_eq!(effects, vec![Effect::OpenUrl { url }]);
    assert_eq!(*state.phase(), JobPhase::Idle);
    assert_eq!(state.notice(), Some(&StartNotice::AuthLinkOpened));
    assert!(state.view().can_start);
}

#[test]
fn started_then_processing_ticks_then_done() {
    init_logging();
    let state = online(AppState::new());
    let (state, _) = start_with(state, "me@example.com");
    let (mut state, effects) = reply(state, Ok(StartReply::Status(JobStatus::Started)));
    assert_eq!(
        effects,
        vec![Effect::ActivatePoller {
            ticket: 1,
            user_email: "me@example.com".to_string(),
        }]
    );

    for _ in 0..3 {
        let (next, effects) = tick(state, Ok(JobStatus::Processing));
        assert!(effects.is_empty());
        assert_eq!(next.view().phase, PhaseView::Processing);
        state = next;
    }
    assert_eq!(state.poll_ticks(), 3);

    let (state, effects) = tick(state, Ok(JobStatus::Done(JobOutcome::Records(Vec::new()))));
    assert_eq!(effects, vec![Effect::DeactivatePoller]);
    let view = state.view();
    assert_eq!(view.phase, PhaseView::Done);
    assert!(view.rows.is_empty());
    assert_eq!(view.empty_message, None);
    assert!(view.can_start);

    let (_state, effects) = update(state, Msg::StartClicked);
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::StartJob { ticket: 2, .. })));
}

#[test]
fn empty_message_is_kept_apart_from_empty_records() {
    init_logging();
    let state = processing_job();
    let outcome = JobOutcome::Empty {
        message: "No new job emails".to_string(),
    };
    let (state, _) = tick(state, Ok(JobStatus::Done(outcome)));

    let view = state.view();
    assert_eq!(view.empty_message.as_deref(), Some("No new job emails"));
    assert_eq!(view.total_records, 0);
}

#[test]
fn immediate_records_skip_polling_and_are_presented() {
    init_logging();
    let state = online(AppState::new());
    let (state, _) = start_with(state, "me@example.com");
    let records = vec![
        ClassifiedRecord::new("Acme", "2024-03-01", Verdict::Rejected),
        ClassifiedRecord::new("Globex", "2024-03-02", Verdict::OfferReceived),
        ClassifiedRecord::new("", "", Verdict::Unknown),
    ];
    let (state, effects) = reply(
        state,
        Ok(StartReply::Status(JobStatus::Done(JobOutcome::Records(
            records,
        )))),
    );
    assert!(effects.is_empty());

    let companies: Vec<_> = state.view().rows.into_iter().map(|r| r.company).collect();
    assert_eq!(companies, vec!["Globex", "Acme", "Unknown company"]);

    let (state, _) = update(state, Msg::FilterSelected(FilterSelection::Positive));
    let view = state.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].verdict, Verdict::OfferReceived);
    assert_eq!(view.total_records, 3);
}

#[test]
fn backend_reported_error_is_terminal() {
    init_logging();
    let state = processing_job();
    let (state, effects) = tick(state, Ok(JobStatus::Error));

    assert_eq!(effects, vec![Effect::DeactivatePoller]);
    assert_eq!(*state.phase(), JobPhase::Error(JobError::BackendReported));
    assert_eq!(state.view().status_line, "Something went wrong");
}

#[test]
fn start_failures_become_error_phase() {
    init_logging();
    for err in [
        JobError::Network("dns".to_string()),
        JobError::Protocol("no recognizable fields".to_string()),
    ] {
        let state = online(AppState::new());
        let (state, _) = start_with(state, "me@example.com");
        let (state, effects) = reply(state, Err(err.clone()));
        assert!(effects.is_empty());
        assert_eq!(*state.phase(), JobPhase::Error(err));
    }
}

#[test]
fn transient_poll_failures_are_tolerated_until_the_bound() {
    init_logging();
    let settings = CoreSettings {
        max_consecutive_poll_failures: Some(3),
        ..CoreSettings::default()
    };
    let state = online(AppState::with_settings(settings));
    let (state, _) = start_with(state, "me@example.com");
    let (state, _) = reply(state, Ok(StartReply::Status(JobStatus::Processing)));

    let blip = || Err(JobError::Network("reset".to_string()));
    let (state, effects) = tick(state, blip());
    assert!(effects.is_empty());
    let (state, effects) = tick(state, blip());
    assert!(effects.is_empty());
    // A good tick resets the streak.
    let (state, _) = tick(state, Ok(JobStatus::Processing));
    assert_eq!(state.poll_failures(), 0);

    let (state, _) = tick(state, blip());
    let (state, _) = tick(state, blip());
    assert_eq!(state.view().phase, PhaseView::Processing);
    let (state, effects) = tick(state, blip());
    assert_eq!(effects, vec![Effect::DeactivatePoller]);
    assert_eq!(
        *state.phase(),
        JobPhase::Error(JobError::Network("reset".to_string()))
    );
}

#[test]
fn unbounded_tolerance_never_fails_on_blips() {
    init_logging();
    let settings = CoreSettings {
        max_consecutive_poll_failures: None,
        ..CoreSettings::default()
    };
    let state = online(AppState::with_settings(settings));
    let (state, _) = start_with(state, "me@example.com");
    let (mut state, _) = reply(state, Ok(StartReply::Status(JobStatus::Started)));
    for _ in 0..50 {
        let (next, effects) = tick(state, Err(JobError::Network("timeout".to_string())));
        assert!(effects.is_empty());
        state = next;
    }
    assert_eq!(*state.phase(), JobPhase::Processing);
}

#[test]
fn stale_ticks_and_replies_do_not_mutate_state() {
    init_logging();
    let state = processing_job();
    let (state, _) = tick(state, Ok(JobStatus::Error));
    let (state, _) = update(state, Msg::StartClicked);
    assert_eq!(state.ticket(), 2);

    let before = state.clone();
    let (after, effects) = update(
        state,
        Msg::PollTicked {
            ticket: 1,
            result: Ok(JobStatus::Done(JobOutcome::Records(Vec::new()))),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(before, after);

    let (after, effects) = update(
        after,
        Msg::StartResponded {
            ticket: 1,
            result: Ok(StartReply::Status(JobStatus::Started)),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(before, after);
}

#[test]
fn tick_after_terminal_is_discarded() {
    init_logging();
    let state = processing_job();
    let (state, _) = tick(state, Ok(JobStatus::Done(JobOutcome::Records(Vec::new()))));
    let before = state.clone();
    let (after, effects) = tick(state, Ok(JobStatus::Error));

    assert!(effects.is_empty());
    assert_eq!(before, after);
}

#[test]
fn fresh_start_clears_previous_results() {
    init_logging();
    let state = processing_job();
    let outcome = JobOutcome::Records(vec![ClassifiedRecord::new(
        "Acme",
        "",
        Verdict::Rejected,
    )]);
    let (state, _) = tick(state, Ok(JobStatus::Done(outcome)));
    assert_eq!(state.view().rows.len(), 1);

    let (state, _) = update(state, Msg::StartClicked);
    let view = state.view();
    assert!(view.rows.is_empty());
    assert_eq!(view.phase, PhaseView::Starting);
}
