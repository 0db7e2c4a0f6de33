//! Whole-application documents: the edited form and the submission payload.

use serde::{Deserialize, Serialize};

use super::app_config::{ApplicationConfig, ApplicationConfigForm};
use super::env_var::EnvVar;
use super::port::PortPublication;
use super::repository::RepositoryForm;
use super::website::{CreateWebsiteInput, Website, WebsiteForm};

/// Everything the console edits for one application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDocument {
    pub name: String,
    #[serde(default)]
    pub repository: Option<RepositoryForm>,
    #[serde(default)]
    pub config: ApplicationConfigForm,
    #[serde(default)]
    pub websites: Vec<WebsiteForm>,
    /// Websites currently stored for the application, if it already exists
    #[serde(default)]
    pub persisted_websites: Vec<Website>,
    #[serde(default)]
    pub env_vars: Vec<EnvVar>,
    #[serde(default)]
    pub port_publications: Vec<PortPublication>,
}

/// Validated, wire-ready form of an [`ApplicationDocument`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    pub name: String,
    pub config: ApplicationConfig,
    pub websites: Vec<CreateWebsiteInput>,
    pub env_vars: Vec<EnvVar>,
    pub port_publications: Vec<PortPublication>,
}
