//! FQDN decomposition against the catalog of available domains.
//!
//! Non-wildcard entries match an fqdn exactly and win over wildcard entries.
//! A wildcard entry `*.trap.show` matches any fqdn ending in `.trap.show`;
//! the part before the suffix is the subdomain.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{is_wildcard_domain, AvailableDomain, CreateWebsiteInput, WebsiteForm};
use crate::validation::{CoreError, Result};

/// What to do with an fqdn no catalog entry matches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedDomainPolicy {
    /// Report [`CoreError::DomainNotFound`]
    #[default]
    Reject,
    /// Reassign the website to the first catalog domain with no subdomain
    FirstAvailable,
}

/// An fqdn split into its editable parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedHost {
    pub subdomain: String,
    /// Catalog entry verbatim, `*` included
    pub domain: String,
}

/// Find the catalog entry serving `fqdn`, or `None` if nothing matches.
pub fn match_domain<'a>(fqdn: &str, domains: &'a [AvailableDomain]) -> Option<&'a AvailableDomain> {
    if let Some(exact) = domains
        .iter()
        .find(|d| !d.is_wildcard() && d.domain == fqdn)
    {
        return Some(exact);
    }

    domains
        .iter()
        .filter(|d| d.is_wildcard())
        .find(|d| fqdn.ends_with(&d.stripped()))
}

/// Split `fqdn` into `(subdomain, domain)`.
pub fn extract_host(fqdn: &str, domains: &[AvailableDomain]) -> Result<ResolvedHost> {
    let matched = match_domain(fqdn, domains).ok_or_else(|| CoreError::DomainNotFound {
        fqdn: fqdn.to_string(),
    })?;

    if !matched.is_wildcard() {
        return Ok(ResolvedHost {
            subdomain: String::new(),
            domain: matched.domain.clone(),
        });
    }

    let suffix = matched.stripped();
    let subdomain = fqdn
        .strip_suffix(suffix.as_str())
        .unwrap_or_default()
        .to_string();
    debug!(fqdn = %fqdn, domain = %matched.domain, subdomain = %subdomain, "Matched wildcard domain");

    Ok(ResolvedHost {
        subdomain,
        domain: matched.domain.clone(),
    })
}

/// Like [`extract_host`], but an unmatched fqdn lands on the first catalog
/// domain with an empty subdomain.
pub fn extract_host_lenient(fqdn: &str, domains: &[AvailableDomain]) -> Result<ResolvedHost> {
    match extract_host(fqdn, domains) {
        Err(CoreError::DomainNotFound { .. }) => {
            let first = domains.first().ok_or(CoreError::NoDomainsAvailable)?;
            warn!(fqdn = %fqdn, fallback = %first.domain, "No available domain matches, falling back to first domain");
            Ok(ResolvedHost {
                subdomain: String::new(),
                domain: first.domain.clone(),
            })
        }
        other => other,
    }
}

/// Resolve `fqdn` under the given policy
pub fn resolve_host(
    fqdn: &str,
    domains: &[AvailableDomain],
    policy: UnmatchedDomainPolicy,
) -> Result<ResolvedHost> {
    match policy {
        UnmatchedDomainPolicy::Reject => extract_host(fqdn, domains),
        UnmatchedDomainPolicy::FirstAvailable => extract_host_lenient(fqdn, domains),
    }
}

/// Rebuild an fqdn from its parts. The subdomain only contributes for
/// wildcard domains.
pub fn compose_fqdn(subdomain: &str, domain: &str) -> String {
    if is_wildcard_domain(domain) {
        format!("{}{}", subdomain, domain.replace('*', ""))
    } else {
        domain.to_string()
    }
}

/// Form representation of a submitted or persisted website
pub fn website_to_form(
    input: &CreateWebsiteInput,
    domains: &[AvailableDomain],
    policy: UnmatchedDomainPolicy,
) -> Result<WebsiteForm> {
    let host = resolve_host(&input.fqdn, domains, policy)?;
    let mut form = WebsiteForm {
        subdomain: host.subdomain,
        domain: host.domain,
        path_prefix: input.path_prefix.clone(),
        strip_prefix: input.strip_prefix,
        https: input.https,
        h2c: input.h2c,
        http_port: input.http_port,
        authentication: input.authentication,
    };
    if let Some(domain) = domains.iter().find(|d| d.domain == form.domain) {
        if form.authentication.requires_auth() && !domain.auth_available {
            warn!(fqdn = %input.fqdn, domain = %domain.domain, "Authentication not available for domain, turning it off");
        }
        form.select_domain(domain);
    }
    Ok(form)
}

/// Submission input for a website form; the fqdn is derived from the
/// subdomain and domain.
pub fn form_to_website(form: &WebsiteForm) -> CreateWebsiteInput {
    CreateWebsiteInput {
        fqdn: compose_fqdn(&form.subdomain, &form.domain),
        path_prefix: form.path_prefix.clone(),
        strip_prefix: form.strip_prefix,
        https: form.https,
        h2c: form.h2c,
        http_port: form.http_port,
        authentication: form.authentication,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<AvailableDomain> {
        vec![
            AvailableDomain::new("*.trap.show").with_auth(true),
            AvailableDomain::new("example.com"),
        ]
    }

    #[test]
    fn test_wildcard_inverse() {
        let domains = catalog();
        let host = extract_host("foo.trap.show", &domains).unwrap();
        assert_eq!(host.subdomain, "foo");
        assert_eq!(host.domain, "*.trap.show");
        assert_eq!(compose_fqdn(&host.subdomain, &host.domain), "foo.trap.show");
    }

    #[test]
    fn test_nested_subdomain() {
        let host = extract_host("a.b.trap.show", &catalog()).unwrap();
        assert_eq!(host.subdomain, "a.b");
        assert_eq!(compose_fqdn(&host.subdomain, &host.domain), "a.b.trap.show");
    }

    #[test]
    fn test_exact_match() {
        let host = extract_host("example.com", &catalog()).unwrap();
        assert_eq!(
            host,
            ResolvedHost {
                subdomain: String::new(),
                domain: "example.com".to_string(),
            }
        );
        assert_eq!(compose_fqdn("ignored", "example.com"), "example.com");
    }

    #[test]
    fn test_exact_match_beats_wildcard() {
        let domains = vec![
            AvailableDomain::new("*.b.com"),
            AvailableDomain::new("a.b.com"),
        ];
        let host = extract_host("a.b.com", &domains).unwrap();
        assert_eq!(host.domain, "a.b.com");
        assert_eq!(host.subdomain, "");

        let other = extract_host("c.b.com", &domains).unwrap();
        assert_eq!(other.domain, "*.b.com");
        assert_eq!(other.subdomain, "c");
    }

    #[test]
    fn test_unmatched_is_rejected() {
        let err = extract_host("nowhere.org", &catalog()).unwrap_err();
        assert!(matches!(err, CoreError::DomainNotFound { ref fqdn } if fqdn == "nowhere.org"));
    }

    #[test]
    fn test_lenient_fallback() {
        let host = extract_host_lenient("nowhere.org", &catalog()).unwrap();
        assert_eq!(host.domain, "*.trap.show");
        assert_eq!(host.subdomain, "");

        assert!(matches!(
            extract_host_lenient("nowhere.org", &[]),
            Err(CoreError::NoDomainsAvailable)
        ));
    }

    #[test]
    fn test_resolve_host_policy() {
        let domains = catalog();
        assert!(resolve_host("x.org", &domains, UnmatchedDomainPolicy::Reject).is_err());
        assert!(resolve_host("x.org", &domains, UnmatchedDomainPolicy::FirstAvailable).is_ok());
    }

    #[test]
    fn test_website_to_form_turns_off_unavailable_auth() {
        let input = CreateWebsiteInput {
            fqdn: "example.com".to_string(),
            path_prefix: "/".to_string(),
            strip_prefix: false,
            https: true,
            h2c: false,
            http_port: 80,
            authentication: crate::models::AuthenticationType::Hard,
        };
        let form = website_to_form(&input, &catalog(), UnmatchedDomainPolicy::Reject).unwrap();
        assert_eq!(form.authentication, crate::models::AuthenticationType::Off);
    }

    #[test]
    fn test_website_form_round_trip() {
        let input = CreateWebsiteInput {
            fqdn: "api.trap.show".to_string(),
            path_prefix: "/v1".to_string(),
            strip_prefix: true,
            https: true,
            h2c: true,
            http_port: 8080,
            authentication: crate::models::AuthenticationType::Soft,
        };
        let form = website_to_form(&input, &catalog(), UnmatchedDomainPolicy::Reject).unwrap();
        assert_eq!(form.subdomain, "api");
        assert_eq!(form.domain, "*.trap.show");
        assert_eq!(form_to_website(&form), input);
    }
}
