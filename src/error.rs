//! Error types for the console
//!
//! `ConsoleError` covers everything that talks to the backend or validates user
//! input. The queue engines have their own, much smaller error surface
//! (`ConfirmError`) because they never touch the network.

use thiserror::Error;

/// Result alias used by the session gate and the backend client
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Application-level error types
///
/// The `Display` output of `Auth`, `Network` and `Validation` is the bare
/// message so that views can surface it verbatim (login form, error toast).
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Credentials were rejected or the login call could not complete
    #[error("{0}")]
    Auth(String),

    /// A CRUD call failed (transport error, non-2xx status or unreadable body)
    #[error("{0}")]
    Network(String),

    /// Client-side validation failed before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Unexpected failure (catch-all)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ConsoleError {
    /// Whether this error came from authentication
    pub fn is_auth(&self) -> bool {
        matches!(self, ConsoleError::Auth(_))
    }

    /// Whether this error came from client-side validation
    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::Validation(_))
    }
}

/// Errors returned by the confirmation engine
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmError {
    /// `confirm` was called on an engine that has been shut down
    #[error("confirm() called outside an active confirmation engine")]
    Inactive,

    /// The engine was torn down before the user answered
    #[error("confirmation abandoned before the user answered")]
    Abandoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_surface_verbatim() {
        let err = ConsoleError::Auth("Erro ao autenticar".to_string());
        assert_eq!(err.to_string(), "Erro ao autenticar");
        assert!(err.is_auth());

        let err = ConsoleError::Validation("Extensão não permitida!".to_string());
        assert_eq!(err.to_string(), "Extensão não permitida!");
        assert!(err.is_validation());
        assert!(!err.is_auth());
    }

    #[test]
    fn test_internal_from_anyhow() {
        let err: ConsoleError = anyhow::anyhow!("boom").into();
        assert!(err.to_string().contains("boom"));
    }
}
