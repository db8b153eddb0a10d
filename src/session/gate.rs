//! Session gate
//!
//! Holds the single `authenticated` flag. It starts from whatever token is in
//! session storage, turns on after a successful login and turns off on logout
//! or when a protected view is evaluated with no token present.

use super::client::{AuthClient, Credential};
use super::routes::{Route, RouteDecision, PUBLIC_ROOT};
use super::storage::{SessionStorage, TOKEN_KEY};
use crate::error::ConsoleResult;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Something that can move the UI to another view
pub trait Navigator: Send + Sync {
    /// Navigate to `path`
    fn navigate(&self, path: &str);
}

/// Authentication state and the route guard
pub struct SessionGate {
    client: AuthClient,
    storage: Arc<dyn SessionStorage>,
    authenticated: watch::Sender<bool>,
}

impl SessionGate {
    /// Create the gate, deriving the initial state from stored credentials
    pub fn new(client: AuthClient, storage: Arc<dyn SessionStorage>) -> Self {
        let initial = storage.get(TOKEN_KEY).is_some();
        let (authenticated, _) = watch::channel(initial);
        debug!(authenticated = initial, "Session gate initialized");
        Self {
            client,
            storage,
            authenticated,
        }
    }

    /// Current value of the flag
    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    /// Token currently stored for this session
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    /// Watch the flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    /// Log in and store the returned token
    ///
    /// # Errors
    /// * `ConsoleError::Auth` when the backend rejects the credentials or the
    ///   call fails; the flag is left untouched in that case.
    pub async fn login(&self, email: &str, senha: &str) -> ConsoleResult<Credential> {
        let credential = self
            .client
            .login_request(email, senha)
            .await
            .map_err(|e| {
                warn!(email = %email, error = %e, "Login failed");
                e
            })?;

        self.storage.set(TOKEN_KEY, &credential.api_key);
        self.set_authenticated(true);
        info!(email = %email, "Logged in");
        Ok(credential)
    }

    /// Log out
    ///
    /// The backend revoke is best-effort; the stored token is always cleared
    /// and the flag always ends up `false`.
    pub async fn logout(&self) {
        let token = self.token();
        self.client.logout_request(token.as_deref()).await;
        self.storage.remove(TOKEN_KEY);
        self.set_authenticated(false);
        info!("Logged out");
    }

    /// Decide whether `route` may be rendered
    ///
    /// Public routes always render. A protected route renders only with the
    /// flag set and a token in storage; otherwise the flag is forced off and
    /// the caller is sent to the public entry view.
    pub fn guard(&self, route: Route) -> RouteDecision {
        if !route.is_protected() {
            return RouteDecision::Render;
        }
        if self.is_authenticated() && self.token().is_some() {
            return RouteDecision::Render;
        }

        self.set_authenticated(false);
        debug!(path = route.path(), "Protected route requested without a session");
        RouteDecision::Redirect(PUBLIC_ROOT)
    }

    /// Keep the UI on the public entry view while unauthenticated
    ///
    /// Navigates to `/` right away if the flag is already off and again every
    /// time it turns off. The task ends when the gate is dropped.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn spawn_redirect_effect(&self, navigator: Arc<dyn Navigator>) -> JoinHandle<()> {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            if !*rx.borrow_and_update() {
                navigator.navigate(PUBLIC_ROOT);
            }
            while rx.changed().await.is_ok() {
                if !*rx.borrow_and_update() {
                    debug!("Session ended, redirecting to the public view");
                    navigator.navigate(PUBLIC_ROOT);
                }
            }
        })
    }

    fn set_authenticated(&self, value: bool) {
        self.authenticated.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}
