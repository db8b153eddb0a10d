//! Scheduled callbacks
//!
//! Both queue engines drive their `Active -> Leaving -> removed` lifecycle
//! through a `Scheduler` instead of calling `tokio::time::sleep` directly, so
//! that tests can swap in a virtual clock.

pub mod manual;

pub use manual::ManualScheduler;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Callback run when a timer fires
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a callback after a delay
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay` unless the returned handle is cancelled first
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle;
}

/// Handle to a scheduled callback
///
/// Cancelling is idempotent; a cancelled callback never runs.
#[derive(Clone)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    /// Build a handle around a shared cancellation flag
    pub fn new(cancelled: Arc<AtomicBool>, abort: Option<AbortHandle>) -> Self {
        Self { cancelled, abort }
    }

    /// Cancel the callback if it has not run yet
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Scheduler backed by tokio tasks
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler that spawns onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler for the runtime we are currently running on
    ///
    /// Returns `None` when called outside a tokio runtime.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        // Measured from now, not from the task's first poll
        let deadline = Instant::now() + delay;

        let join = self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if !flag.load(Ordering::SeqCst) {
                task();
            }
        });

        TimerHandle::new(cancelled, Some(join.abort_handle()))
    }
}
