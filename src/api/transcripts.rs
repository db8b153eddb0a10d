//! Customer service transcripts

use super::{opt_string_or_number, ApiClient};
use crate::error::ConsoleResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use serde::Deserialize;

const IMAGE_SUFFIXES: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".bmp"];

/// One conversation between a customer and an agent
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transcript {
    /// Customer name
    #[serde(default)]
    pub nome_usuario: String,
    /// Customer email
    #[serde(default)]
    pub email: String,
    /// Customer contact
    #[serde(default)]
    pub contato: String,
    /// Conversation status
    #[serde(default)]
    pub status: String,
    /// Agent that handled the conversation
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub agente_id: Option<String>,
    /// Start timestamp
    #[serde(default)]
    pub inicio: Option<String>,
    /// End timestamp
    #[serde(default)]
    pub fim: Option<String>,
    /// Messages in order
    #[serde(default)]
    pub mensagens: Vec<TranscriptMessage>,
}

/// One message in a transcript
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscriptMessage {
    /// Sender name
    #[serde(default)]
    pub remetente: Option<String>,
    /// Message text
    #[serde(default)]
    pub texto: Option<String>,
    /// Message text (older payloads)
    #[serde(default)]
    pub mensagem: Option<String>,
    /// Title for link previews
    #[serde(default)]
    pub titulo: Option<String>,
    /// Timestamp
    #[serde(default)]
    pub horario: Option<String>,
    /// Timestamp (older payloads)
    #[serde(default)]
    pub data: Option<String>,
    /// Attachments sent with the message: URLs or `{url|link|conteudo, ...}` objects
    #[serde(default)]
    pub anexos: Vec<serde_json::Value>,
}

impl TranscriptMessage {
    /// Text of the message, whichever field carried it
    pub fn text(&self) -> &str {
        self.texto
            .as_deref()
            .or(self.mensagem.as_deref())
            .unwrap_or_default()
    }

    /// Timestamp of the message, whichever field carried it
    pub fn timestamp(&self) -> Option<&str> {
        self.horario.as_deref().or(self.data.as_deref())
    }

    /// Whether the customer (rather than the agent) sent it
    pub fn is_from_customer(&self, transcript: &Transcript) -> bool {
        self.remetente.as_deref() == Some(transcript.nome_usuario.as_str())
    }

    /// URLs of the attachments, skipping entries without one
    pub fn attachment_urls(&self) -> Vec<&str> {
        self.anexos
            .iter()
            .filter_map(|att| match att {
                serde_json::Value::String(url) => Some(url.as_str()),
                serde_json::Value::Object(obj) => ["url", "link", "conteudo"]
                    .iter()
                    .find_map(|key| obj.get(*key).and_then(|v| v.as_str())),
                _ => None,
            })
            .filter(|url| !url.is_empty())
            .collect()
    }
}

#[derive(Deserialize)]
struct TranscriptList {
    #[serde(default)]
    atendimentos: Vec<Transcript>,
}

impl ApiClient {
    /// `GET /agente/listar_atendimentos`
    pub async fn list_transcripts(&self) -> ConsoleResult<Vec<Transcript>> {
        let request = self.http.get(self.url("/agente/listar_atendimentos"));
        let body: TranscriptList = self
            .execute(request, "Erro ao carregar atendimentos.")
            .await?;
        Ok(body.atendimentos)
    }
}

/// Whether `text` is a bare http(s) URL pointing at an image
pub fn is_image_url(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match rest {
        Some(rest) => IMAGE_SUFFIXES
            .iter()
            .any(|suffix| rest.len() > suffix.len() && rest.ends_with(suffix)),
        None => false,
    }
}

/// Format a backend timestamp as `dd/mm/yyyy`, adding `, HH:MM` when the
/// time of day is not midnight
///
/// Empty input gives an empty string; input that does not parse is returned
/// unchanged.
pub fn format_date_br(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }

    match parse_timestamp(value) {
        Some(dt) if dt.hour() != 0 || dt.minute() != 0 || dt.second() != 0 => {
            dt.format("%d/%m/%Y, %H:%M").to_string()
        }
        Some(dt) => dt.format("%d/%m/%Y").to_string(),
        None => value.to_string(),
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
