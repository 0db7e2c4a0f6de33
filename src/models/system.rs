//! Read-only system info snapshot: available domains and port ranges.

use serde::{Deserialize, Serialize};

use super::port::PortRange;

/// A domain websites may be placed on.
///
/// Entries starting with `*` are wildcard domains: `*.trap.show` accepts any
/// `<subdomain>.trap.show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDomain {
    pub domain: String,
    #[serde(default, alias = "auth_available")]
    pub auth_available: bool,
    #[serde(default, alias = "already_bound")]
    pub already_bound: bool,
}

impl AvailableDomain {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            auth_available: false,
            already_bound: false,
        }
    }

    pub fn with_auth(mut self, auth_available: bool) -> Self {
        self.auth_available = auth_available;
        self
    }

    pub fn with_already_bound(mut self, already_bound: bool) -> Self {
        self.already_bound = already_bound;
        self
    }

    pub fn is_wildcard(&self) -> bool {
        is_wildcard_domain(&self.domain)
    }

    /// The domain with every `*` removed, e.g. `*.trap.show` -> `.trap.show`
    pub fn stripped(&self) -> String {
        self.domain.replace('*', "")
    }
}

/// Whether a catalog domain string is a wildcard entry
pub fn is_wildcard_domain(domain: &str) -> bool {
    domain.starts_with('*')
}

/// Catalog supplied once per editing session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub domains: Vec<AvailableDomain>,
    #[serde(default)]
    pub ports: Vec<PortRange>,
}

impl SystemInfo {
    /// Look up a catalog entry by its exact domain string
    pub fn find_domain(&self, domain: &str) -> Option<&AvailableDomain> {
        self.domains.iter().find(|d| d.domain == domain)
    }
}
