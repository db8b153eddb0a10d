//! Toast data types

use crate::queue::{ItemId, Phase};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of toast, which determines its styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Operation completed
    Success,
    /// Something failed
    Error,
    /// Neutral information
    Info,
}

impl NotificationKind {
    /// CSS-style class name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

/// Per-toast overrides for `Notifier::push`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOptions {
    /// Auto-dismiss delay in milliseconds; `Some(0)` or negative disables it,
    /// `None` uses the engine default
    pub timeout_ms: Option<i64>,
}

impl PushOptions {
    /// Override the auto-dismiss delay
    pub fn timeout_ms(ms: i64) -> Self {
        Self {
            timeout_ms: Some(ms),
        }
    }

    /// Keep the toast until it is removed explicitly
    pub fn sticky() -> Self {
        Self::timeout_ms(0)
    }
}

/// Toast payload stored in the queue
#[derive(Debug, Clone)]
pub(crate) struct Toast {
    pub(crate) kind: NotificationKind,
    pub(crate) message: String,
    pub(crate) timeout_ms: i64,
}

/// Snapshot of a toast as it should be rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Identifier, usable with `Notifier::remove`
    pub id: ItemId,
    /// Kind of toast
    pub kind: NotificationKind,
    /// Text shown to the user
    pub message: String,
    /// Effective auto-dismiss delay (<= 0 means none)
    pub timeout_ms: i64,
    /// Current lifecycle phase
    pub phase: Phase,
}

impl Notification {
    /// Whether the exit styling should be applied
    pub fn is_leaving(&self) -> bool {
        self.phase == Phase::Leaving
    }
}

/// Delay after which a toast starts leaving on its own, if any
pub(crate) fn auto_dismiss_delay(timeout_ms: i64) -> Option<Duration> {
    u64::try_from(timeout_ms)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}
