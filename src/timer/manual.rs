//! Virtual-clock scheduler
//!
//! Nothing fires until `advance` is called. Callbacks due within the advanced
//! window run in (due time, scheduling order), and callbacks scheduled by a
//! running callback are picked up in the same `advance` if they fall inside
//! the window.

use super::{Scheduler, TimerHandle, TimerTask};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

struct PendingTask {
    due: Duration,
    seq: u64,
    cancelled: Arc<AtomicBool>,
    task: TimerTask,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    pending: Vec<PendingTask>,
}

/// Scheduler driven by an explicit virtual clock
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    /// Create a scheduler with its clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current virtual time since creation
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of callbacks still waiting to fire
    pub fn pending(&self) -> usize {
        self.lock()
            .pending
            .iter()
            .filter(|p| !p.cancelled.load(Ordering::SeqCst))
            .count()
    }

    /// Move the clock forward, running every callback that becomes due
    pub fn advance(&self, by: Duration) {
        let target = self.lock().now + by;

        loop {
            let next = {
                let mut state = self.lock();
                state.pending.retain(|p| !p.cancelled.load(Ordering::SeqCst));

                let index = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);

                match index {
                    Some(i) => {
                        let task = state.pending.swap_remove(i);
                        state.now = task.due;
                        task
                    }
                    None => {
                        state.now = target;
                        break;
                    }
                }
            };

            // Run without holding the lock: the callback may schedule more work.
            if !next.cancelled.load(Ordering::SeqCst) {
                (next.task)();
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut state = self.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now + delay;
        state.pending.push(PendingTask {
            due,
            seq,
            cancelled: Arc::clone(&cancelled),
            task,
        });
        TimerHandle::new(cancelled, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> TimerTask {
        let log = Arc::clone(log);
        Box::new(move || log.lock().unwrap().push(name))
    }

    #[test]
    fn test_nothing_fires_before_due() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        scheduler.schedule(Duration::from_millis(50), recorder(&log, "a"));

        scheduler.advance(Duration::from_millis(49));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
        assert_eq!(scheduler.now(), Duration::from_millis(50));
    }

    #[test]
    fn test_fires_in_due_then_schedule_order() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        scheduler.schedule(Duration::from_millis(20), recorder(&log, "late"));
        scheduler.schedule(Duration::from_millis(10), recorder(&log, "first"));
        scheduler.schedule(Duration::from_millis(10), recorder(&log, "second"));

        scheduler.advance(Duration::from_millis(100));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "late"]);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let handle = scheduler.schedule(Duration::from_millis(10), recorder(&log, "a"));
        handle.cancel();

        scheduler.advance(Duration::from_secs(1));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_chained_schedule_within_window() {
        let scheduler = Arc::new(ManualScheduler::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_scheduler = Arc::clone(&scheduler);
        let inner_log = Arc::clone(&log);
        scheduler.schedule(
            Duration::from_millis(100),
            Box::new(move || {
                inner_log.lock().unwrap().push("outer");
                inner_scheduler.schedule(Duration::from_millis(50), recorder(&inner_log, "inner"));
            }),
        );

        scheduler.advance(Duration::from_millis(120));
        assert_eq!(*log.lock().unwrap(), vec!["outer"]);

        scheduler.advance(Duration::from_millis(30));
        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
        assert_eq!(scheduler.now(), Duration::from_millis(150));
    }
}
