use std::time::{Duration, Instant};

/// A periodic task driven by the event loop.
///
/// The loop polls the task; there is no background thread. Starting a task
/// that is already running keeps its schedule, and cancelling is idempotent.
#[derive(Clone, Debug)]
pub struct RepeatingTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTask {
    pub fn new(interval: Duration) -> Self {
        RepeatingTask {
            interval,
            next_due: None,
        }
    }

    /// Schedules the first run immediately
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true when a run is due, and schedules the next one
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                // Missed periods are dropped rather than replayed.
                let next = due + self.interval;
                self.next_due = Some(if next > now {
                    next
                } else {
                    now + self.interval
                });
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

/// A cancellable one-shot deadline
#[derive(Clone, Debug, Default)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timeout, replacing any earlier deadline
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns true exactly once, when the deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_task_runs_immediately_then_on_cadence() {
        let t0 = Instant::now();
        let mut task = RepeatingTask::new(FRAME);
        assert!(!task.poll(t0));
        task.start(t0);
        assert!(task.poll(t0));
        assert!(!task.poll(t0 + Duration::from_millis(10)));
        assert!(task.poll(t0 + FRAME));
        assert_eq!(task.time_until_due(t0 + FRAME), Some(FRAME));
    }

    #[test]
    fn test_task_drops_missed_periods() {
        let t0 = Instant::now();
        let mut task = RepeatingTask::new(FRAME);
        task.start(t0);
        assert!(task.poll(t0));
        let late = t0 + Duration::from_millis(100);
        assert!(task.poll(late));
        assert!(!task.poll(late));
    }

    #[test]
    fn test_restart_keeps_schedule() {
        let t0 = Instant::now();
        let mut task = RepeatingTask::new(FRAME);
        task.start(t0);
        task.poll(t0);
        task.start(t0 + Duration::from_millis(1));
        assert!(!task.poll(t0 + Duration::from_millis(1)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let t0 = Instant::now();
        let mut task = RepeatingTask::new(FRAME);
        task.cancel();
        task.start(t0);
        task.cancel();
        task.cancel();
        assert!(!task.is_running());
        assert!(!task.poll(t0 + FRAME));

        let mut timeout = Timeout::new();
        timeout.cancel();
        timeout.schedule(t0, FRAME);
        timeout.cancel();
        timeout.cancel();
        assert!(!timeout.poll(t0 + FRAME));
    }

    #[test]
    fn test_timeout_fires_once_and_reschedule_replaces() {
        let t0 = Instant::now();
        let mut timeout = Timeout::new();
        timeout.schedule(t0, Duration::from_millis(1000));
        timeout.schedule(t0 + Duration::from_millis(500), Duration::from_millis(1000));
        assert!(!timeout.poll(t0 + Duration::from_millis(1000)));
        assert!(timeout.poll(t0 + Duration::from_millis(1500)));
        assert!(!timeout.poll(t0 + Duration::from_millis(2000)));
        assert_eq!(timeout.time_until_due(t0), None);
    }
}
