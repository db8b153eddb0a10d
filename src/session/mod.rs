//! Authentication and access control for the console views

pub mod client;
pub mod gate;
pub mod routes;
pub mod storage;

pub use client::{AuthClient, Credential, DEFAULT_AUTH_ERROR};
pub use gate::{Navigator, SessionGate};
pub use routes::{Route, RouteDecision, PUBLIC_ROOT};
pub use storage::{MemorySessionStorage, SessionStorage, TOKEN_KEY};
