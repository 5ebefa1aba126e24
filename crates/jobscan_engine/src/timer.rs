use std::time::Duration;

use jobscan_core::Msg;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Delivers one message after a delay unless cancelled first.
///
/// Scheduling again replaces the pending delivery. Dropping the timer
/// cancels it.
pub struct OneShotTimer {
    sink: UnboundedSender<Msg>,
    pending: Option<JoinHandle<()>>,
}

impl OneShotTimer {
    pub fn new(sink: UnboundedSender<Msg>) -> Self {
        Self {
            sink,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn schedule(&mut self, delay: Duration, msg: Msg) {
        self.cancel();
        let sink = self.sink.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sink.send(msg);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
