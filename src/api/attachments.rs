//! Attachment endpoints
//!
//! Files travel as base64 inside JSON. Links are stored as plain URLs.

use super::ApiClient;
use crate::error::{ConsoleError, ConsoleResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Extensions accepted for image attachments
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

/// Extensions accepted for document attachments
pub const DOCUMENT_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "xls", "xlsx", "txt"];

/// Message shown when a file's extension does not match its kind
pub const EXTENSION_NOT_ALLOWED: &str = "Extensão não permitida!";

/// Attachment kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Image file
    Imagem,
    /// Document file
    Documento,
    /// External URL
    Link,
}

impl AttachmentKind {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Imagem => "imagem",
            AttachmentKind::Documento => "documento",
            AttachmentKind::Link => "link",
        }
    }

    /// Parse a wire name
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "imagem" => Some(AttachmentKind::Imagem),
            "documento" => Some(AttachmentKind::Documento),
            "link" => Some(AttachmentKind::Link),
            _ => None,
        }
    }

    /// Extensions accepted for this kind (empty for links)
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            AttachmentKind::Imagem => &IMAGE_EXTENSIONS,
            AttachmentKind::Documento => &DOCUMENT_EXTENSIONS,
            AttachmentKind::Link => &[],
        }
    }

    /// MIME type used when saving a downloaded file
    pub fn mime(&self) -> &'static str {
        match self {
            AttachmentKind::Imagem => "image/*",
            AttachmentKind::Documento => "application/*",
            AttachmentKind::Link => "text/plain",
        }
    }
}

/// Check that `file_name` has an extension allowed for `kind`
///
/// # Errors
/// * `ConsoleError::Validation` with `EXTENSION_NOT_ALLOWED` otherwise.
pub fn validate_file_name(kind: AttachmentKind, file_name: &str) -> ConsoleResult<()> {
    if kind == AttachmentKind::Link {
        return Ok(());
    }
    let extension = file_name.rsplit('.').next().unwrap_or_default().to_lowercase();
    if kind.allowed_extensions().contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ConsoleError::Validation(EXTENSION_NOT_ALLOWED.to_string()))
    }
}

/// Size label shown next to a file, in mebibytes with two decimals
pub fn format_size_mb(len: usize) -> String {
    format!("{:.2} MB", len as f64 / (1024.0 * 1024.0))
}

/// Body of `POST /anexos/cadastrar`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAttachment {
    /// Kind
    pub tipo: AttachmentKind,
    /// File name or link title
    pub nome: String,
    /// Base64 file content, or the URL for links
    pub conteudo: String,
    /// Size label (empty for links)
    pub tamanho: String,
}

impl NewAttachment {
    /// Prepare a file upload
    ///
    /// # Errors
    /// * `ConsoleError::Validation` when the extension does not match `kind`.
    pub fn from_file(kind: AttachmentKind, file_name: &str, bytes: &[u8]) -> ConsoleResult<Self> {
        validate_file_name(kind, file_name)?;
        Ok(Self {
            tipo: kind,
            nome: file_name.to_string(),
            conteudo: STANDARD.encode(bytes),
            tamanho: format_size_mb(bytes.len()),
        })
    }

    /// Prepare a link
    pub fn link(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            tipo: AttachmentKind::Link,
            nome: name.into(),
            conteudo: url.into(),
            tamanho: String::new(),
        }
    }
}

/// Attachment as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Attachment {
    /// Name
    #[serde(default, alias = "nome_documento")]
    pub nome: String,
    /// Kind as sent by the backend
    #[serde(default, alias = "tipo_documento")]
    pub tipo: String,
    /// Size label
    #[serde(default, alias = "tamanho_documento")]
    pub tamanho: String,
    /// Short code identifying the attachment
    #[serde(default)]
    pub short_code: String,
}

impl Attachment {
    /// Parsed kind, if the backend sent a known one
    pub fn kind(&self) -> Option<AttachmentKind> {
        AttachmentKind::parse(&self.tipo)
    }

    /// Case-insensitive match on name, kind, size or short code
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [&self.nome, &self.tipo, &self.tamanho, &self.short_code]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Attachments matching `query`, in their original order
pub fn filter_attachments<'a>(attachments: &'a [Attachment], query: &str) -> Vec<&'a Attachment> {
    attachments.iter().filter(|a| a.matches(query)).collect()
}

/// Downloaded attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
    /// A link; open the URL
    Link(String),
    /// A file to save
    File {
        /// Suggested file name
        name: String,
        /// MIME type
        mime: &'static str,
        /// Decoded content
        bytes: Vec<u8>,
    },
}

#[derive(Deserialize)]
struct DownloadBody {
    #[serde(default)]
    tipo: String,
    #[serde(default)]
    nome: Option<String>,
    #[serde(default)]
    conteudo: String,
}

#[derive(Deserialize)]
struct AttachmentList {
    #[serde(default)]
    anexos: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    short_code: String,
}

impl ApiClient {
    /// `GET /anexos/listar`
    ///
    /// A missing or malformed `anexos` field yields an empty list.
    pub async fn list_attachments(&self) -> ConsoleResult<Vec<Attachment>> {
        let request = self.http.get(self.url("/anexos/listar"));
        let body: AttachmentList = self.execute(request, "Erro ao carregar anexos.").await?;
        Ok(body
            .anexos
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default())
    }

    /// `POST /anexos/cadastrar`, returning the new short code
    pub async fn upload_attachment(&self, attachment: &NewAttachment) -> ConsoleResult<String> {
        let request = self.http.post(self.url("/anexos/cadastrar")).json(attachment);
        let body: UploadResponse = self.execute(request, "Erro ao cadastrar anexo.").await?;
        info!(short_code = %body.short_code, tipo = attachment.tipo.as_str(), "Attachment uploaded");
        Ok(body.short_code)
    }

    /// `GET /anexos/download/{short_code}`
    pub async fn download_attachment(&self, short_code: &str) -> ConsoleResult<AttachmentContent> {
        const FALLBACK: &str = "Erro ao baixar documento.";

        let request = self
            .http
            .get(self.url(&format!("/anexos/download/{}", short_code)));
        let body: DownloadBody = self.execute(request, FALLBACK).await?;

        if body.tipo == AttachmentKind::Link.as_str() {
            return Ok(AttachmentContent::Link(body.conteudo));
        }

        let bytes = STANDARD.decode(body.conteudo.trim()).map_err(|e| {
            warn!(short_code = %short_code, error = %e, "Attachment content is not valid base64");
            ConsoleError::Network(FALLBACK.to_string())
        })?;

        Ok(AttachmentContent::File {
            name: body
                .nome
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "arquivo".to_string()),
            mime: AttachmentKind::parse(&body.tipo)
                .map(|kind| kind.mime())
                .unwrap_or("application/octet-stream"),
            bytes,
        })
    }

    /// `DELETE /anexos/excluir/{short_code}`
    pub async fn delete_attachment(&self, short_code: &str) -> ConsoleResult<()> {
        let request = self
            .http
            .delete(self.url(&format!("/anexos/excluir/{}", short_code)));
        let _: serde_json::Value = self.execute(request, "Erro ao excluir anexo.").await?;
        info!(short_code = %short_code, "Attachment deleted");
        Ok(())
    }

    /// URL serving the raw file for in-browser viewing
    pub fn file_url(&self, short_code: &str) -> String {
        self.url(&format!("/anexos/file/{}", short_code))
    }
}
