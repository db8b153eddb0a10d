//! Agent Console
//!
//! Client-side core of the agent administration console: the session gate
//! that protects its views, the toast notification queue, the modal
//! confirmation queue and a typed client for the backend endpoints.
//! The `agent-console` binary wires them together.

pub mod api;
pub mod config;
pub mod confirm;
pub mod console;
pub mod error;
pub mod notifications;
/// Ordered queue with the `Active -> Leaving -> removed` lifecycle
pub mod queue;
pub mod session;
pub mod timer;

pub use config::Config;
pub use console::Console;
pub use error::{ConfirmError, ConsoleError, ConsoleResult};
