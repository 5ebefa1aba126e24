/// Reachability of the job backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LivenessState {
    #[default]
    Checking,
    Online,
    Offline,
}

/// What the liveness block asks the runtime to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LivenessAction {
    Probe,
    ScheduleRetry,
    CancelRetryAndProbe,
    CancelRetry,
    WentOnline,
}

/// Probe bookkeeping. Only liveness messages write to this.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Liveness {
    state: LivenessState,
    attempt: u32,
    probe_in_flight: bool,
    retry_scheduled: bool,
}

impl Liveness {
    pub fn state(&self) -> LivenessState {
        self.state
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_online(&self) -> bool {
        self.state == LivenessState::Online
    }

    pub fn probe_in_flight(&self) -> bool {
        self.probe_in_flight
    }

    pub fn retry_scheduled(&self) -> bool {
        self.retry_scheduled
    }

    pub(crate) fn activate(&mut self) -> Vec<LivenessAction> {
        if self.is_online() || self.probe_in_flight {
            return Vec::new();
        }
        self.probe_in_flight = true;
        vec![LivenessAction::Probe]
    }

    pub(crate) fn probe_succeeded(&mut self) -> Vec<LivenessAction> {
        self.probe_in_flight = false;
        if self.is_online() {
            return Vec::new();
        }
        self.state = LivenessState::Online;
        let mut actions = Vec::with_capacity(2);
        if std::mem::take(&mut self.retry_scheduled) {
            actions.push(LivenessAction::CancelRetry);
        }
        actions.push(LivenessAction::WentOnline);
        actions
    }

    pub(crate) fn probe_failed(&mut self) -> Vec<LivenessAction> {
        self.probe_in_flight = false;
        if self.is_online() {
            return Vec::new();
        }
        self.state = LivenessState::Offline;
        if self.retry_scheduled {
            return Vec::new();
        }
        self.retry_scheduled = true;
        vec![LivenessAction::ScheduleRetry]
    }

    /// The scheduled delay ran out. Ignored if it was cancelled meanwhile.
    pub(crate) fn retry_elapsed(&mut self) -> Vec<LivenessAction> {
        if !std::mem::take(&mut self.retry_scheduled) {
            return Vec::new();
        }
        if self.state != LivenessState::Offline || self.probe_in_flight {
            return Vec::new();
        }
        self.attempt = self.attempt.saturating_add(1);
        self.probe_in_flight = true;
        vec![LivenessAction::Probe]
    }

    /// User asked to retry now instead of waiting for the timer.
    pub(crate) fn retry_now(&mut self) -> Vec<LivenessAction> {
        if self.state != LivenessState::Offline || self.probe_in_flight {
            return Vec::new();
        }
        self.attempt = self.attempt.saturating_add(1);
        self.probe_in_flight = true;
        if std::mem::take(&mut self.retry_scheduled) {
            vec![LivenessAction::CancelRetryAndProbe]
        } else {
            vec![LivenessAction::Probe]
        }
    }

    pub(crate) fn teardown(&mut self) -> Vec<LivenessAction> {
        self.probe_in_flight = false;
        if std::mem::take(&mut self.retry_scheduled) {
            vec![LivenessAction::CancelRetry]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Liveness, LivenessAction, LivenessState};

    #[test]
    fn failures_schedule_a_single_retry_each() {
        let mut liveness = Liveness::default();
        assert_eq!(liveness.activate(), vec![LivenessAction::Probe]);
        assert_eq!(liveness.activate(), Vec::new());

        assert_eq!(liveness.probe_failed(), vec![LivenessAction::ScheduleRetry]);
        assert_eq!(liveness.state(), LivenessState::Offline);

        assert_eq!(liveness.retry_elapsed(), vec![LivenessAction::Probe]);
        assert_eq!(liveness.attempt(), 1);
        assert_eq!(liveness.retry_elapsed(), Vec::new());
    }

    #[test]
    fn manual_retry_cancels_the_pending_timer() {
        let mut liveness = Liveness::default();
        liveness.activate();
        liveness.probe_failed();

        assert_eq!(
            liveness.retry_now(),
            vec![LivenessAction::CancelRetryAndProbe]
        );
        // A second click while the probe is out does nothing.
        assert_eq!(liveness.retry_now(), Vec::new());
        // The cancelled timer firing late is ignored.
        assert_eq!(liveness.retry_elapsed(), Vec::new());
        assert_eq!(liveness.attempt(), 1);
    }

    #[test]
    fn online_is_reported_once() {
        let mut liveness = Liveness::default();
        liveness.activate();
        assert_eq!(liveness.probe_succeeded(), vec![LivenessAction::WentOnline]);
        assert_eq!(liveness.probe_succeeded(), Vec::new());
        assert_eq!(liveness.activate(), Vec::new());
        assert_eq!(liveness.retry_now(), Vec::new());
    }
}
