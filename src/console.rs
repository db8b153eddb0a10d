//! Composition root
//!
//! Builds the engines and clients once from `Config` and hands them to the
//! views. Nothing here is global; tests build as many consoles as they like.

use crate::api::ApiClient;
use crate::config::Config;
use crate::confirm::Confirmer;
use crate::error::{ConsoleError, ConsoleResult};
use crate::notifications::Notifier;
use crate::session::{AuthClient, MemorySessionStorage, SessionGate, SessionStorage};
use crate::timer::{Scheduler, TokioScheduler};
use anyhow::anyhow;
use std::sync::Arc;
use tracing::info;

/// Everything a console view needs
#[derive(Clone)]
pub struct Console {
    config: Config,
    /// Toast queue
    pub notifier: Notifier,
    /// Modal prompt queue
    pub confirmer: Confirmer,
    /// Authentication state and route guard
    pub session: Arc<SessionGate>,
    /// Backend client
    pub api: ApiClient,
}

impl Console {
    /// Build a console on the current tokio runtime with in-memory session storage
    ///
    /// # Errors
    /// * `ConsoleError::Internal` when called outside a tokio runtime or the
    ///   HTTP client cannot be built.
    pub fn new(config: Config) -> ConsoleResult<Self> {
        let scheduler = TokioScheduler::current()
            .ok_or_else(|| anyhow!("Console must be created inside a tokio runtime"))?;
        Self::with_parts(
            config,
            Arc::new(scheduler),
            Arc::new(MemorySessionStorage::new()),
        )
    }

    /// Build a console from explicit timer and storage implementations
    ///
    /// # Errors
    /// * `ConsoleError::Internal` when the HTTP client cannot be built.
    pub fn with_parts(
        config: Config,
        scheduler: Arc<dyn Scheduler>,
        storage: Arc<dyn SessionStorage>,
    ) -> ConsoleResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .build()
            .map_err(|e| ConsoleError::Internal(anyhow!("Failed to build HTTP client: {}", e)))?;

        let session = SessionGate::new(AuthClient::new(http.clone(), &config.api), storage);
        let console = Self {
            notifier: Notifier::new(config.notifications, Arc::clone(&scheduler)),
            confirmer: Confirmer::new(config.confirmations, scheduler),
            session: Arc::new(session),
            api: ApiClient::new(http, &config.api),
            config,
        };

        info!(
            api_url = %console.config.api.base_url,
            authenticated = console.session.is_authenticated(),
            "Console initialized"
        );
        Ok(console)
    }

    /// Configuration the console was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Tear the engines down
    ///
    /// Pending timers are cancelled and visible toasts are cleared. Later
    /// toasts are ignored, and any caller still awaiting a confirmation gets
    /// `ConfirmError::Abandoned`.
    pub fn shutdown(&self) {
        self.notifier.shutdown();
        self.confirmer.shutdown();
        info!("Console shut down");
    }
}
