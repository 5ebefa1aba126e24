use std::future::Future;
use std::time::Duration;

use jobscan_core::{JobError, JobStatus, JobTicket, Msg};
use jobscan_logging::{jobscan_debug, jobscan_trace};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Repeating status poll for at most one job at a time.
///
/// Ticks fire on a fixed schedule and each one issues its own request, so a
/// slow reply only delays its own [`Msg::PollTicked`]. Replies are forwarded
/// in arrival order. The schedule ends by itself after forwarding the first
/// terminal status, dropping any replies still outstanding, and is cancelled
/// when deactivated or dropped.
pub struct Poller {
    interval: Duration,
    sink: UnboundedSender<Msg>,
    active: Option<PollHandle>,
}

struct PollHandle {
    ticket: JobTicket,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

impl Poller {
    pub fn new(interval: Duration, sink: UnboundedSender<Msg>) -> Self {
        Self {
            interval,
            sink,
            active: None,
        }
    }

    /// A schedule that ended on a terminal tick no longer counts as active.
    pub fn is_active(&self) -> bool {
        self.live_handle().is_some()
    }

    pub fn active_ticket(&self) -> Option<JobTicket> {
        self.live_handle().map(|handle| handle.ticket)
    }

    fn live_handle(&self) -> Option<&PollHandle> {
        self.active
            .as_ref()
            .filter(|handle| !handle.task.is_finished())
    }

    /// Starts polling with `poll_fn`. Returns `false` and does nothing if a
    /// schedule already exists. Must be called from within a tokio runtime.
    pub fn activate<F, Fut>(&mut self, ticket: JobTicket, poll_fn: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<JobStatus, JobError>> + Send + 'static,
    {
        if let Some(existing) = self.live_handle() {
            jobscan_debug!(
                "Poller already active for ticket {}; ignoring ticket {}",
                existing.ticket,
                ticket
            );
            return false;
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_schedule(
            ticket,
            self.interval,
            poll_fn,
            self.sink.clone(),
            cancel.clone(),
        ));
        jobscan_debug!("Poller activated for ticket {}", ticket);
        self.active = Some(PollHandle {
            ticket,
            cancel,
            task,
        });
        true
    }

    /// Cancels the schedule. Safe to call when inactive.
    pub fn deactivate(&mut self) {
        if let Some(handle) = self.active.take() {
            jobscan_debug!("Poller deactivated for ticket {}", handle.ticket);
        }
    }
}

async fn run_schedule<F, Fut>(
    ticket: JobTicket,
    period: Duration,
    mut poll_fn: F,
    sink: UnboundedSender<Msg>,
    cancel: CancellationToken,
) where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<JobStatus, JobError>> + Send + 'static,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Requests run beside the schedule so a hung one never holds back later
    // ticks. Dropping the set aborts whatever is still in flight.
    let mut requests = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(joined) = requests.join_next(), if !requests.is_empty() => {
                let result: Result<JobStatus, JobError> = match joined {
                    Ok(result) => result,
                    Err(err) => {
                        jobscan_debug!("Poll request for ticket {} ended early: {}", ticket, err);
                        continue;
                    }
                };
                if cancel.is_cancelled() {
                    break;
                }
                let terminal = matches!(&result, Ok(status) if status.is_terminal());
                jobscan_trace!("Poll reply for ticket {} terminal={}", ticket, terminal);
                if sink.send(Msg::PollTicked { ticket, result }).is_err() || terminal {
                    break;
                }
            }
            _ = ticker.tick() => {
                jobscan_trace!(
                    "Poll tick for ticket {} ({} requests in flight)",
                    ticket,
                    requests.len()
                );
                requests.spawn(poll_fn());
            }
        }
    }
}
