use std::sync::Arc;
use std::time::Duration;

use jobscan_core::{update, AppState, AppViewModel, CoreSettings, Effect, JobError, Msg};
use jobscan_logging::{jobscan_debug, jobscan_info, jobscan_warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

use crate::{Backend, OneShotTimer, Poller, UrlOpener};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval: Duration,
    pub health_retry_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            health_retry_delay: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub core: CoreSettings,
    pub timing: Timing,
}

type OnOnline = Box<dyn FnOnce() + Send>;

/// Owns the orchestration state for one user session and executes the
/// effects the pure core asks for.
///
/// All state changes happen inside [`Session::dispatch`], on whichever task
/// drives the session. Network calls, the poller and the retry timer run as
/// tokio tasks that only report back through the session's message channel.
pub struct Session {
    state: AppState,
    backend: Arc<dyn Backend>,
    opener: Arc<dyn UrlOpener>,
    timing: Timing,
    poller: Poller,
    health_retry: OneShotTimer,
    requests: JoinSet<()>,
    msg_tx: UnboundedSender<Msg>,
    msg_rx: UnboundedReceiver<Msg>,
    on_online: Option<OnOnline>,
}

impl Session {
    /// Builds the session and starts liveness probing. Must be called from
    /// within a tokio runtime.
    pub fn create(
        backend: Arc<dyn Backend>,
        opener: Arc<dyn UrlOpener>,
        config: SessionConfig,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            state: AppState::with_settings(config.core),
            backend,
            opener,
            timing: config.timing,
            poller: Poller::new(config.timing.poll_interval, msg_tx.clone()),
            health_retry: OneShotTimer::new(msg_tx.clone()),
            requests: JoinSet::new(),
            msg_tx,
            msg_rx,
            on_online: None,
        };
        session.dispatch(Msg::Activated);
        session
    }

    /// Registers the callback fired the first time the backend is reachable.
    pub fn on_online(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_online = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    pub fn health_retry_pending(&self) -> bool {
        self.health_retry.is_pending()
    }

    /// Returns whether the view changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    /// Applies one message and runs the resulting effects.
    pub fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    /// Waits for the next background report and applies it.
    pub async fn next(&mut self) {
        if let Some(msg) = self.msg_rx.recv().await {
            self.dispatch(msg);
        }
        while self.requests.try_join_next().is_some() {}
    }

    /// Keeps applying background reports until `done` holds.
    pub async fn run_until(&mut self, mut done: impl FnMut(&AppState) -> bool) {
        while !done(&self.state) {
            self.next().await;
        }
    }

    /// Stops polling, cancels the liveness retry and drops in-flight requests.
    pub fn dispose(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.state.is_disposed() {
            jobscan_info!("Disposing session");
            self.dispatch(Msg::Disposed);
        }
        self.poller.deactivate();
        self.health_retry.cancel();
        self.requests.abort_all();
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::ProbeHealth => {
                let backend = self.backend.clone();
                let tx = self.msg_tx.clone();
                self.requests.spawn(async move {
                    let result = backend.probe_health().await.map_err(|err| {
                        jobscan_debug!("Health probe failed: {}", err);
                        JobError::from(err)
                    });
                    let _ = tx.send(Msg::HealthProbed(result));
                });
            }
            Effect::ScheduleHealthRetry => {
                self.health_retry
                    .schedule(self.timing.health_retry_delay, Msg::HealthRetryElapsed);
            }
            Effect::CancelHealthRetry => self.health_retry.cancel(),
            Effect::BackendOnline => {
                if let Some(callback) = self.on_online.take() {
                    callback();
                }
            }
            Effect::StartJob { ticket, request } => {
                let backend = self.backend.clone();
                let tx = self.msg_tx.clone();
                self.requests.spawn(async move {
                    let result = backend.start_job(&request).await.map_err(|err| {
                        jobscan_warn!("Start request failed with {}: {}", err.kind, err.message);
                        JobError::from(err)
                    });
                    let _ = tx.send(Msg::StartResponded { ticket, result });
                });
            }
            Effect::ActivatePoller { ticket, user_email } => {
                let backend = self.backend.clone();
                self.poller.activate(ticket, move || {
                    let backend = backend.clone();
                    let user_email = user_email.clone();
                    async move {
                        backend.job_status(&user_email).await.map_err(|err| {
                            jobscan_debug!("Status request failed with {}: {}", err.kind, err.message);
                            JobError::from(err)
                        })
                    }
                });
            }
            Effect::DeactivatePoller => self.poller.deactivate(),
            Effect::OpenUrl { url } => {
                if let Err(err) = self.opener.open(&url) {
                    jobscan_warn!("Could not open authorization link: {}", err);
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
