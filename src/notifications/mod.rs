//! Transient toast notifications
//!
//! `Notifier` owns the toast queue; `Notification` is what a view renders.

pub mod notification;
pub mod notifier;

pub use notification::{Notification, NotificationKind, PushOptions};
pub use notifier::Notifier;
