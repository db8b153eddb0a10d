//! Agent configuration endpoints

use super::{string_or_number, ApiClient};
use crate::error::ConsoleResult;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Channels an agent can be allowed to receive or send
pub const PERMISSIONS: [&str; 4] = ["Texto", "Áudio", "Imagem", "Documentos"];

/// A single permission flag as the backend stores it
///
/// `valor` is `"true"` when granted and `""` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Channel name
    pub nome: String,
    /// `"true"` or `""`
    #[serde(default)]
    pub valor: String,
}

impl Permission {
    /// Build a flag for `nome`
    pub fn new(nome: impl Into<String>, granted: bool) -> Self {
        Self {
            nome: nome.into(),
            valor: if granted { "true" } else { "" }.to_string(),
        }
    }

    /// Whether the flag is set
    pub fn is_granted(&self) -> bool {
        !self.valor.is_empty()
    }
}

/// Build the full permission list with `granted` switched on
pub fn permissions_from(granted: &[&str]) -> Vec<Permission> {
    PERMISSIONS
        .iter()
        .map(|nome| Permission::new(*nome, granted.contains(nome)))
        .collect()
}

/// Allowed domains, stored by the backend either as text or as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowedDomains {
    /// List of domains
    List(Vec<String>),
    /// Free text as typed in the form
    Text(String),
}

impl AllowedDomains {
    /// Human-readable form
    pub fn display(&self) -> String {
        match self {
            AllowedDomains::List(domains) => domains.join(", "),
            AllowedDomains::Text(text) => text.clone(),
        }
    }
}

/// Agent as returned by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Agent {
    /// Backend identifier
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub nome_agente: String,
    /// System instructions
    #[serde(default)]
    pub instrucoes: String,
    /// Model name
    #[serde(default)]
    pub modelo: String,
    /// AI provider
    #[serde(default)]
    pub ia: String,
    /// Provider API key
    #[serde(default)]
    pub chave_api: String,
    /// Domains the agent may be embedded in
    #[serde(default)]
    pub dominios_permitidos: Option<AllowedDomains>,
    /// Accepted input channels
    #[serde(default)]
    pub permissoes_entrada: Vec<Permission>,
    /// Allowed output channels
    #[serde(default)]
    pub permissoes_saida: Vec<Permission>,
    /// Public URL generated by the backend
    #[serde(default)]
    pub url: String,
    /// Creation date as sent by the backend
    #[serde(default)]
    pub data_criacao: Option<String>,
}

impl Agent {
    /// Pre-fill an edit form from this agent
    pub fn to_form(&self) -> AgentForm {
        let granted = |list: &[Permission]| -> Vec<Permission> {
            let names: Vec<&str> = list
                .iter()
                .filter(|p| p.is_granted())
                .map(|p| p.nome.as_str())
                .collect();
            permissions_from(&names)
        };

        AgentForm {
            nome_agente: self.nome_agente.clone(),
            instrucoes: self.instrucoes.clone(),
            modelo: self.modelo.clone(),
            ia: if self.ia.is_empty() {
                AgentForm::DEFAULT_IA.to_string()
            } else {
                self.ia.clone()
            },
            chave_api: self.chave_api.clone(),
            dominios_permitidos: self
                .dominios_permitidos
                .as_ref()
                .map(AllowedDomains::display)
                .unwrap_or_default(),
            permissoes_entrada: granted(&self.permissoes_entrada),
            permissoes_saida: granted(&self.permissoes_saida),
            url: String::new(),
        }
    }
}

/// Body sent when creating or editing an agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentForm {
    /// Display name
    pub nome_agente: String,
    /// System instructions
    pub instrucoes: String,
    /// Model name
    pub modelo: String,
    /// AI provider
    pub ia: String,
    /// Provider API key
    pub chave_api: String,
    /// Domains the agent may be embedded in
    pub dominios_permitidos: String,
    /// Accepted input channels (always the full list)
    pub permissoes_entrada: Vec<Permission>,
    /// Allowed output channels (always the full list)
    pub permissoes_saida: Vec<Permission>,
    /// Always empty; the backend generates it
    pub url: String,
}

impl AgentForm {
    /// Provider preselected in a blank form
    pub const DEFAULT_IA: &'static str = "ChatGPT";

    /// Blank form for a new agent
    pub fn new(nome_agente: impl Into<String>) -> Self {
        Self {
            nome_agente: nome_agente.into(),
            instrucoes: String::new(),
            modelo: String::new(),
            ia: Self::DEFAULT_IA.to_string(),
            chave_api: String::new(),
            dominios_permitidos: String::new(),
            permissoes_entrada: permissions_from(&[]),
            permissoes_saida: permissions_from(&[]),
            url: String::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgentList {
    Bare(Vec<Agent>),
    Wrapped { agentes: Vec<Agent> },
    Other(serde_json::Value),
}

impl ApiClient {
    /// `GET /agente/listar_agentes`
    ///
    /// Accepts a bare array or `{agentes: [...]}`; anything else is an empty list.
    pub async fn list_agents(&self) -> ConsoleResult<Vec<Agent>> {
        let request = self.http.get(self.url("/agente/listar_agentes"));
        let list: AgentList = self.execute(request, "Erro ao carregar agentes.").await?;
        Ok(match list {
            AgentList::Bare(agents) | AgentList::Wrapped { agentes: agents } => agents,
            AgentList::Other(_) => Vec::new(),
        })
    }

    /// `GET /agente/obter_agente/{id}`
    pub async fn get_agent(&self, id: &str) -> ConsoleResult<Agent> {
        let request = self.http.get(self.url(&format!("/agente/obter_agente/{}", id)));
        self.execute(request, "Erro ao carregar agente.").await
    }

    /// `POST /agente/criar_agente`
    pub async fn create_agent(&self, form: &AgentForm) -> ConsoleResult<()> {
        let request = self.http.post(self.url("/agente/criar_agente")).json(form);
        let _: serde_json::Value = self.execute(request, "Erro ao salvar agente.").await?;
        info!(nome_agente = %form.nome_agente, "Agent created");
        Ok(())
    }

    /// `PUT /agente/editar_agente/{id}`
    pub async fn update_agent(&self, id: &str, form: &AgentForm) -> ConsoleResult<()> {
        let request = self
            .http
            .put(self.url(&format!("/agente/editar_agente/{}", id)))
            .json(form);
        let _: serde_json::Value = self.execute(request, "Erro ao salvar agente.").await?;
        info!(agent_id = %id, "Agent updated");
        Ok(())
    }

    /// `DELETE /agente/excluir_agente/{id}`
    pub async fn delete_agent(&self, id: &str) -> ConsoleResult<()> {
        let request = self
            .http
            .delete(self.url(&format!("/agente/excluir_agente/{}", id)));
        let _: serde_json::Value = self.execute(request, "Erro ao excluir agente.").await?;
        info!(agent_id = %id, "Agent deleted");
        Ok(())
    }
}
