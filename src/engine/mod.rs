//! Conversion, matching and reconciliation algorithms.
//!
//! Everything here is synchronous and works on caller-owned values; the
//! system info catalog is always passed in explicitly.

pub mod config_variant;
pub mod domain_resolver;
pub mod env_reconcile;
pub mod port_range;
pub mod website_lifecycle;

pub use config_variant::{to_form, to_message, validate_config_form};
pub use domain_resolver::{
    compose_fqdn, extract_host, extract_host_lenient, form_to_website, match_domain,
    resolve_host, website_to_form, ResolvedHost, UnmatchedDomainPolicy,
};
pub use env_reconcile::{apply_env_diff, reconcile, EnvVarDiff, EnvVarStore};
pub use port_range::{is_valid_port, suggest_port, suggest_port_with, validate_port_publication};
pub use website_lifecycle::{
    next_state, EditEvent, EditState, WebsiteEditRecord, WebsiteWorkingSet,
};
