//! Authentication calls against the backend
//!
//! `POST /user/login` with `{email, senha}` answers `{api_key}` or `{error}`.
//! `POST /logout` is optional on the backend; we call it best-effort.

use crate::config::ApiConfig;
use crate::error::{ConsoleError, ConsoleResult};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Message used when the backend gives no better one
pub const DEFAULT_AUTH_ERROR: &str = "Erro ao autenticar";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    senha: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    api_key: Option<String>,
    error: Option<String>,
}

/// Credential returned by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Opaque API token
    pub api_key: String,
}

/// HTTP client for the authentication endpoints
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    logout_timeout: Duration,
}

impl AuthClient {
    /// Create a client sharing an existing connection pool
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            logout_timeout: config.logout_timeout,
        }
    }

    /// Exchange credentials for an API token
    ///
    /// # Errors
    /// * `ConsoleError::Auth` with the backend's `error` message verbatim when
    ///   the status is not 2xx, `DEFAULT_AUTH_ERROR` when there is no message
    ///   or no `api_key` came back, or the transport error text.
    pub async fn login_request(&self, email: &str, senha: &str) -> ConsoleResult<Credential> {
        let url = format!("{}/user/login", self.base_url);
        debug!(url = %url, email = %email, "Sending login request");

        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { email, senha })
            .send()
            .await
            .map_err(|e| ConsoleError::Auth(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConsoleError::Auth(e.to_string()))?;
        let parsed: LoginResponse = serde_json::from_str(&body).unwrap_or_default();

        if !status.is_success() {
            debug!(status = status.as_u16(), "Login rejected");
            return Err(ConsoleError::Auth(
                parsed
                    .error
                    .unwrap_or_else(|| DEFAULT_AUTH_ERROR.to_string()),
            ));
        }

        match parsed.api_key.filter(|key| !key.is_empty()) {
            Some(api_key) => Ok(Credential { api_key }),
            None => Err(ConsoleError::Auth(DEFAULT_AUTH_ERROR.to_string())),
        }
    }

    /// Ask the backend to revoke `token`
    ///
    /// Never fails: transport errors, error statuses and timeouts are logged
    /// and swallowed. Bounded by the configured logout timeout.
    pub async fn logout_request(&self, token: Option<&str>) {
        let url = format!("{}/logout", self.base_url);
        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.logout_timeout);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Logout request sent");
            }
            Err(e) => {
                warn!(error = %e, "Logout request failed, clearing session anyway");
            }
        }
    }
}
