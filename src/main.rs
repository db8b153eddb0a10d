//! Agent Console
//!
//! Headless driver for the console core: builds the engines, keeps the
//! session gate's redirect effect running and mirrors queue activity to the
//! log until Ctrl+C.

use agent_console::config::Config;
use agent_console::queue::QueueEvent;
use agent_console::session::Navigator;
use agent_console::Console;
use std::env;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Navigator that only records where the UI would go
struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        info!(path = %path, "Navigate");
    }
}

fn mirror_events(engine: &'static str, mut rx: broadcast::Receiver<QueueEvent>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = serde_json::to_string(&event).unwrap_or_default();
                    info!(engine, event = %payload, "Queue event");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(engine, skipped, "Queue event log lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn login_from_env(console: &Console) {
    let (Ok(email), Ok(password)) = (env::var("CONSOLE_EMAIL"), env::var("CONSOLE_PASSWORD"))
    else {
        info!("CONSOLE_EMAIL/CONSOLE_PASSWORD not set, staying logged out");
        return;
    };

    match console.session.login(&email, &password).await {
        Ok(_) => {
            console.notifier.success("Login realizado com sucesso");
        }
        Err(e) => {
            console.notifier.error(e.to_string());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    info!(api_url = %config.api.base_url, "Starting agent console");

    let console = Console::new(config)?;
    mirror_events("notifications", console.notifier.subscribe());
    mirror_events("confirmations", console.confirmer.subscribe());
    let redirect = console.session.spawn_redirect_effect(Arc::new(LogNavigator));

    login_from_env(&console).await;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    if console.session.is_authenticated() {
        console.session.logout().await;
    }
    console.shutdown();
    redirect.abort();

    Ok(())
}
