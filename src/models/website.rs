//! Website routing rules: persisted record, submission input and form.

use serde::{Deserialize, Serialize};

use super::system::AvailableDomain;

/// Authentication applied by the platform in front of a website
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticationType {
    #[default]
    Off,
    Soft,
    Hard,
}

impl AuthenticationType {
    /// Whether this setting requires the domain to support authentication
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl std::fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Off => write!(f, "OFF"),
            Self::Soft => write!(f, "SOFT"),
            Self::Hard => write!(f, "HARD"),
        }
    }
}

/// Website settings as submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebsiteInput {
    pub fqdn: String,
    pub path_prefix: String,
    #[serde(default)]
    pub strip_prefix: bool,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub h2c: bool,
    pub http_port: i32,
    #[serde(default)]
    pub authentication: AuthenticationType,
}

/// Website as persisted by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: String,
    pub fqdn: String,
    pub path_prefix: String,
    #[serde(default)]
    pub strip_prefix: bool,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub h2c: bool,
    pub http_port: i32,
    #[serde(default)]
    pub authentication: AuthenticationType,
}

impl Website {
    /// The submittable settings of this website, without its id
    pub fn to_input(&self) -> CreateWebsiteInput {
        CreateWebsiteInput {
            fqdn: self.fqdn.clone(),
            path_prefix: self.path_prefix.clone(),
            strip_prefix: self.strip_prefix,
            https: self.https,
            h2c: self.h2c,
            http_port: self.http_port,
            authentication: self.authentication,
        }
    }
}

/// Editable website. `subdomain` and `domain` are authoritative here; the
/// fqdn is derived from them at submission time.
///
/// `domain` holds the catalog entry verbatim, including a leading `*` for
/// wildcard entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteForm {
    #[serde(default)]
    pub subdomain: String,
    pub domain: String,
    pub path_prefix: String,
    #[serde(default)]
    pub strip_prefix: bool,
    #[serde(default)]
    pub https: bool,
    #[serde(default)]
    pub h2c: bool,
    pub http_port: i32,
    #[serde(default)]
    pub authentication: AuthenticationType,
}

impl WebsiteForm {
    /// A fresh website on `domain` with the console defaults
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            subdomain: String::new(),
            domain: domain.into(),
            path_prefix: "/".to_string(),
            strip_prefix: false,
            https: true,
            h2c: false,
            http_port: 80,
            authentication: AuthenticationType::Off,
        }
    }

    /// Move the website onto `domain`. Authentication is forced off when the
    /// domain does not support it.
    pub fn select_domain(&mut self, domain: &AvailableDomain) {
        self.domain = domain.domain.clone();
        if !domain.auth_available {
            self.authentication = AuthenticationType::Off;
        }
    }
}
