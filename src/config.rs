//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;
use std::time::Duration;

/// Default base URL when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default per-request timeout for CRUD calls, in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default budget for the best-effort logout call, in milliseconds
pub const DEFAULT_LOGOUT_TIMEOUT_MS: u64 = 3000;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend configuration
    pub api: ApiConfig,
    /// Notification engine configuration
    pub notifications: NotifierConfig,
    /// Confirmation engine configuration
    pub confirmations: ConfirmerConfig,
}

/// Backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL prepended to every REST path
    pub base_url: String,
    /// Per-request timeout for CRUD calls
    pub request_timeout: Duration,
    /// Local budget for the best-effort logout call
    pub logout_timeout: Duration,
}

/// Notification engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Timeout used when `push` gets no override (milliseconds, <= 0 disables)
    pub default_timeout_ms: i64,
    /// How long an item stays `Leaving` before it is deleted
    pub exit_window: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 4000,
            exit_window: Duration::from_millis(360),
        }
    }
}

/// Confirmation engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmerConfig {
    /// How long an answered prompt stays `Leaving` before it is deleted
    pub exit_window: Duration,
}

impl Default for ConfirmerConfig {
    fn default() -> Self {
        Self {
            exit_window: Duration::from_millis(300),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let notify_defaults = NotifierConfig::default();
        let confirm_defaults = ConfirmerConfig::default();

        Self {
            api: ApiConfig {
                base_url: env::var("API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
                request_timeout: Duration::from_secs(
                    env_parse("HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
                ),
                logout_timeout: Duration::from_millis(
                    env_parse("LOGOUT_TIMEOUT_MS").unwrap_or(DEFAULT_LOGOUT_TIMEOUT_MS),
                ),
            },
            notifications: NotifierConfig {
                default_timeout_ms: env_parse("NOTIFY_TIMEOUT_MS")
                    .unwrap_or(notify_defaults.default_timeout_ms),
                exit_window: env_parse("NOTIFY_EXIT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(notify_defaults.exit_window),
            },
            confirmations: ConfirmerConfig {
                exit_window: env_parse("CONFIRM_EXIT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(confirm_defaults.exit_window),
            },
        }
    }
}

impl ApiConfig {
    /// Build an API config for the given base URL with default timeouts
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            logout_timeout: Duration::from_millis(DEFAULT_LOGOUT_TIMEOUT_MS),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_engine_defaults() {
        let notify = NotifierConfig::default();
        assert_eq!(notify.default_timeout_ms, 4000);
        assert_eq!(notify.exit_window, Duration::from_millis(360));
        assert_eq!(
            ConfirmerConfig::default().exit_window,
            Duration::from_millis(300)
        );
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let api = ApiConfig::with_base_url("http://api.local/");
        assert_eq!(api.base_url, "http://api.local");
        assert_eq!(api.request_timeout, Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
        assert_eq!(api.logout_timeout, Duration::from_millis(DEFAULT_LOGOUT_TIMEOUT_MS));
    }

    #[test]
    #[serial]
    fn test_from_env_timeout_defaults_match_with_base_url() {
        env::remove_var("HTTP_TIMEOUT_SECS");
        env::remove_var("LOGOUT_TIMEOUT_MS");

        let config = Config::from_env();
        let api = ApiConfig::with_base_url(DEFAULT_API_URL);
        assert_eq!(config.api.request_timeout, api.request_timeout);
        assert_eq!(config.api.logout_timeout, api.logout_timeout);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        env::set_var("API_URL", "http://backend:9000/");
        env::set_var("NOTIFY_TIMEOUT_MS", "0");
        env::set_var("CONFIRM_EXIT_MS", "150");

        let config = Config::from_env();
        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(config.notifications.default_timeout_ms, 0);
        assert_eq!(config.notifications.exit_window, Duration::from_millis(360));
        assert_eq!(config.confirmations.exit_window, Duration::from_millis(150));

        env::remove_var("API_URL");
        env::remove_var("NOTIFY_TIMEOUT_MS");
        env::remove_var("CONFIRM_EXIT_MS");
    }
}
