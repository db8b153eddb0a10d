//! Confirmation engine
//!
//! `confirm` enqueues a modal prompt and hands back a future for the answer.
//! The answer reaches the caller the moment the user clicks; the prompt then
//! stays `Leaving` for the exit window before it is deleted. There is no
//! auto-timeout: a prompt stays up until someone answers it.

use super::resolver::{PendingConfirm, Resolver};
use crate::config::ConfirmerConfig;
use crate::error::ConfirmError;
use crate::queue::{IdAllocator, ItemId, LifecycleQueue, Phase, QueueEvent};
use crate::timer::{Scheduler, TimerHandle};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, error};

/// Label of the affirmative action
pub const DEFAULT_CONFIRM_LABEL: &str = "Confirmar";

/// Label of the negative action
pub const DEFAULT_CANCEL_LABEL: &str = "Cancelar";

const EVENT_CAPACITY: usize = 64;

/// What to ask the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmOptions {
    /// Question shown in the modal
    pub message: String,
    /// Override for the affirmative button label
    pub confirm_label: Option<String>,
    /// Override for the negative button label
    pub cancel_label: Option<String>,
}

impl ConfirmOptions {
    /// Ask `message` with the default labels
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            confirm_label: None,
            cancel_label: None,
        }
    }

    /// Replace both button labels
    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = Some(confirm.into());
        self.cancel_label = Some(cancel.into());
        self
    }
}

/// Snapshot of a prompt as it should be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    /// Identifier, usable with `Confirmer::respond`
    pub id: ItemId,
    /// Question shown in the modal
    pub message: String,
    /// Affirmative button label
    pub confirm_label: String,
    /// Negative button label
    pub cancel_label: String,
    /// Current lifecycle phase
    pub phase: Phase,
}

struct PendingPrompt {
    options: ConfirmOptions,
    resolver: Resolver,
}

struct State {
    active: bool,
    ids: IdAllocator,
    queue: LifecycleQueue<PendingPrompt>,
    timers: HashMap<ItemId, TimerHandle>,
}

struct Shared {
    config: ConfirmerConfig,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<State>,
    events: broadcast::Sender<QueueEvent>,
}

/// Handle to the confirmation engine
///
/// Cloning is cheap; every clone drives the same queue.
#[derive(Clone)]
pub struct Confirmer {
    shared: Arc<Shared>,
}

impl Confirmer {
    /// Create an engine that schedules its timers on `scheduler`
    pub fn new(config: ConfirmerConfig, scheduler: Arc<dyn Scheduler>) -> Self {
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

    /// Show a prompt and return a future for the user's answer
    ///
    /// Returns immediately. Fails with `ConfirmError::Inactive` once the
    /// engine has been shut down.
    pub fn confirm(&self, options: ConfirmOptions) -> Result<PendingConfirm, ConfirmError> {
        let mut state = self.shared.lock();
        if !state.active {
            error!(prompt = %options.message, "confirm() called on an inactive engine");
            return Err(ConfirmError::Inactive);
        }

        let id = state.ids.next_id();
        let (resolver, pending) = Resolver::channel(id);
        state.queue.push_back(id, PendingPrompt { options, resolver });
        drop(state);

        debug!(id = %id, "Confirmation requested");
        self.shared.emit(QueueEvent::Pushed(id));
        Ok(pending)
    }

    /// Answer a prompt
    ///
    /// The first answer resolves the caller and starts the exit window. Any
    /// later answer, or an answer for an unknown id, is ignored and returns
    /// `false`.
    pub fn respond(&self, id: ItemId, answer: bool) -> bool {
        let mut state = self.shared.lock();
        if !state.queue.begin_leave(id) {
            return false;
        }
        if let Some(entry) = state.queue.get_mut(id) {
            entry.payload.resolver.resolve(answer);
        }

        let weak = Arc::downgrade(&self.shared);
        let handle = self.shared.scheduler.schedule(
            self.shared.config.exit_window,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.remove_now(id);
                }
            }),
        );
        state.timers.insert(id, handle);
        drop(state);

        debug!(id = %id, answer, "Confirmation answered");
        self.shared.emit(QueueEvent::Leaving(id));
        true
    }

    /// Activate the affirmative action
    pub fn accept(&self, id: ItemId) -> bool {
        self.respond(id, true)
    }

    /// Activate the negative action
    pub fn reject(&self, id: ItemId) -> bool {
        self.respond(id, false)
    }

    /// Close the prompt without choosing; resolves `false`
    pub fn dismiss(&self, id: ItemId) -> bool {
        self.respond(id, false)
    }

    /// Prompts in display order (oldest first, newest on top)
    pub fn snapshot(&self) -> Vec<Prompt> {
        self.shared
            .lock()
            .queue
            .iter()
            .map(|entry| {
                let options = &entry.payload.options;
                Prompt {
                    id: entry.id,
                    message: options.message.clone(),
                    confirm_label: options
                        .confirm_label
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CONFIRM_LABEL.to_string()),
                    cancel_label: options
                        .cancel_label
                        .clone()
                        .unwrap_or_else(|| DEFAULT_CANCEL_LABEL.to_string()),
                    phase: entry.phase,
                }
            })
            .collect()
    }

    /// Number of prompts, leaving ones included
    pub fn len(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Whether no prompt is shown
    pub fn is_empty(&self) -> bool {
        self.shared.lock().queue.is_empty()
    }

    /// Whether `confirm` is still accepted
    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    /// Subscribe to queue changes
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.shared.events.subscribe()
    }

    /// Stop accepting prompts and drop the pending ones
    ///
    /// Callers still awaiting an answer observe `ConfirmError::Abandoned`.
    pub fn shutdown(&self) {
        let removed = {
            let mut state = self.shared.lock();
            state.active = false;
            for (_, timer) in state.timers.drain() {
                timer.cancel();
            }
            state.queue.drain()
        };

        let abandoned = removed
            .iter()
            .filter(|entry| !entry.payload.resolver.is_resolved())
            .count();
        debug!(abandoned, "Confirmation engine shut down");

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
        let _ = self.events.send(event);
    }

    fn remove_now(&self, id: ItemId) {
        let mut state = self.lock();
        state.timers.remove(&id);
        let removed = state.queue.remove(id).is_some();
        drop(state);

        if removed {
            debug!(id = %id, "Confirmation removed");
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
