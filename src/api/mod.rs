//! Backend REST client
//!
//! Thin typed wrappers over the endpoints the console views call. Every
//! failure is a `ConsoleError::Network` carrying either the backend's `error`
//! message or the view's fallback message, ready to be shown in an error toast.

pub mod agents;
pub mod attachments;
pub mod transcripts;

pub use agents::{permissions_from, Agent, AgentForm, AllowedDomains, Permission, PERMISSIONS};
pub use attachments::{
    filter_attachments, format_size_mb, validate_file_name, Attachment, AttachmentContent,
    AttachmentKind, NewAttachment,
};
pub use transcripts::{format_date_br, is_image_url, Transcript, TranscriptMessage};

use crate::config::ApiConfig;
use crate::error::{ConsoleError, ConsoleResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the agent, attachment and transcript endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client sharing an existing connection pool
    pub fn new(http: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
        }
    }

    /// Base URL every path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        fallback: &str,
    ) -> ConsoleResult<T> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Backend request failed");
            ConsoleError::Network(fallback.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read backend response");
            ConsoleError::Network(fallback.to_string())
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| fallback.to_string());
            warn!(status = status.as_u16(), error = %message, "Backend returned error status");
            return Err(ConsoleError::Network(message));
        }

        serde_json::from_str(&body).map_err(|e| {
            debug!(error = %e, body = %body, "Unexpected backend response body");
            ConsoleError::Network(fallback.to_string())
        })
    }
}

/// Accept ids sent either as JSON strings or numbers
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Same as `string_or_number` for optional fields
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}
