//! Notification engine
//!
//! Toasts are shown most recent first. Each one leaves on its own after its
//! timeout (or when `remove` is called), stays `Leaving` for the exit window,
//! and is then deleted. Every timer belongs to exactly one toast and is
//! cancelled as soon as that toast moves on, so a stale callback can never
//! act on an id that is already gone.

use super::notification::{auto_dismiss_delay, Notification, NotificationKind, PushOptions, Toast};
use crate::config::NotifierConfig;
use crate::queue::{IdAllocator, ItemId, LifecycleQueue, QueueEvent};
use crate::timer::{Scheduler, TimerHandle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 64;

struct State {
    active: bool,
    ids: IdAllocator,
    queue: LifecycleQueue<Toast>,
    timers: HashMap<ItemId, TimerHandle>,
}

struct Shared {
    config: NotifierConfig,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<State>,
    events: broadcast::Sender<QueueEvent>,
}

/// Handle to the notification engine
///
/// Cloning is cheap; every clone drives the same queue. Build one per
/// application and pass it to the views that need it.
#[derive(Clone)]
pub struct Notifier {
    shared: Arc<Shared>,
}

impl Notifier {
    /// Create an engine that schedules its timers on `scheduler`
    pub fn new(config: NotifierConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                config,
                scheduler,
                state: Mutex::new(State {
                    active: true,
                    ids: IdAllocator::default(),
                    queue: LifecycleQueue::new(),
                    timers: HashMap::new(),
                }),
                events,
            }),
        }
    }

    /// Enqueue a toast and return its id
    ///
    /// After `shutdown` the toast is dropped and no timer is armed; the
    /// returned id is never shown.
    pub fn push(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        options: PushOptions,
    ) -> ItemId {
        let timeout_ms = options
            .timeout_ms
            .unwrap_or(self.shared.config.default_timeout_ms);

        let mut state = self.shared.lock();
        let id = state.ids.next_id();
        if !state.active {
            warn!(id = %id, kind = kind.as_str(), "Notification pushed after shutdown, ignored");
            return id;
        }
        state.queue.push_front(
            id,
            Toast {
                kind,
                message: message.into(),
                timeout_ms,
            },
        );

        if let Some(delay) = auto_dismiss_delay(timeout_ms) {
            let weak = Arc::downgrade(&self.shared);
            let handle = self.shared.scheduler.schedule(
                delay,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.start_remove(&weak, id);
                    }
                }),
            );
            state.timers.insert(id, handle);
        }
        drop(state);

        debug!(id = %id, kind = kind.as_str(), timeout_ms, "Notification pushed");
        self.shared.emit(QueueEvent::Pushed(id));
        id
    }

    /// Enqueue a success toast with default options
    pub fn success(&self, message: impl Into<String>) -> ItemId {
        self.push(NotificationKind::Success, message, PushOptions::default())
    }

    /// Enqueue an error toast with default options
    pub fn error(&self, message: impl Into<String>) -> ItemId {
        self.push(NotificationKind::Error, message, PushOptions::default())
    }

    /// Enqueue an info toast with default options
    pub fn info(&self, message: impl Into<String>) -> ItemId {
        self.push(NotificationKind::Info, message, PushOptions::default())
    }

    /// Start removing a toast now, as if its timeout had fired
    ///
    /// Returns `false` when the toast is unknown or already leaving.
    pub fn remove(&self, id: ItemId) -> bool {
        let weak = Arc::downgrade(&self.shared);
        self.shared.start_remove(&weak, id)
    }

    /// Toasts in display order (most recent first)
    pub fn snapshot(&self) -> Vec<Notification> {
        self.shared
            .lock()
            .queue
            .iter()
            .map(|entry| Notification {
                id: entry.id,
                kind: entry.payload.kind,
                message: entry.payload.message.clone(),
                timeout_ms: entry.payload.timeout_ms,
                phase: entry.phase,
            })
            .collect()
    }

    /// Number of toasts, leaving ones included
    pub fn len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Whether no toast is shown
    pub fn is_empty(&self) -> bool {
        self.shared.lock().queue.is_empty()
    }

    /// Subscribe to queue changes
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.shared.events.subscribe()
    }

    /// Whether `push` still shows toasts
    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    /// Cancel every timer, drop every toast and ignore later pushes
    pub fn shutdown(&self) {
        let removed = {
            let mut state = self.shared.lock();
            state.active = false;
            for (_, timer) in state.timers.drain() {
                timer.cancel();
            }
            state.queue.drain()
        };
        debug!(count = removed.len(), "Notification engine shut down");
        for entry in removed {
            self.shared.emit(QueueEvent::Removed(entry.id));
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: QueueEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn start_remove(&self, weak: &Weak<Shared>, id: ItemId) -> bool {
        let mut state = self.lock();
        if !state.queue.begin_leave(id) {
            return false;
        }
        if let Some(timer) = state.timers.remove(&id) {
            timer.cancel();
        }

        let weak = Weak::clone(weak);
        let handle = self.scheduler.schedule(
            self.config.exit_window,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.remove_now(id);
                }
            }),
        );
        state.timers.insert(id, handle);
        drop(state);

        debug!(id = %id, "Notification leaving");
        self.emit(QueueEvent::Leaving(id));
        true
    }

    fn remove_now(&self, id: ItemId) {
        let mut state = self.lock();
        state.timers.remove(&id);
        let removed = state.queue.remove(id).is_some();
        drop(state);

        if removed {
            debug!(id = %id, "Notification removed");
            self.emit(QueueEvent::Removed(id));
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, timer) in state.timers.drain() {
            timer.cancel();
        }
    }
}
