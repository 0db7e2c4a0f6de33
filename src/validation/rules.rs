//! Field and cross-field rules for the console forms.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::engine::domain_resolver::compose_fqdn;
use crate::engine::website_lifecycle::{EditState, WebsiteEditRecord};
use crate::models::{
    AvailableDomain, CreateWebsiteInput, EnvVar, RepositoryAuth, RepositoryForm, WebsiteForm,
};

use super::error::{IssueKind, ValidationErrorBuilder, ValidationErrors, ValidationIssue};

lazy_static! {
    /// Regex for environment variable keys (letters, digits, underscore; no leading digit)
    static ref ENV_KEY_REGEX: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

const MIN_PORT: i32 = 1;
const MAX_PORT: i32 = 65535;

/// Add a `MissingRequired` issue when `value` is blank
pub fn require(errors: &mut ValidationErrorBuilder, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(
            field,
            IssueKind::MissingRequired,
            format!("{} is required", label),
        );
    }
}

/// Parse a port typed into a text input
pub fn parse_port(field: &str, text: &str) -> Result<i32, ValidationIssue> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationIssue::new(
            field,
            IssueKind::MissingRequired,
            "Port is required",
        ));
    }
    let port: i32 = text.parse().map_err(|_| {
        ValidationIssue::new(field, IssueKind::InvalidFormat, "Port must be an integer")
    })?;
    if !(MIN_PORT..=MAX_PORT).contains(&port) {
        return Err(ValidationIssue::new(
            field,
            IssueKind::OutOfRange,
            format!("Port must be between {} and {}", MIN_PORT, MAX_PORT),
        ));
    }
    Ok(port)
}

/// Repository form: name and URL are required, and basic authentication is
/// only allowed over https.
pub fn validate_repository(form: &RepositoryForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();
    require(&mut errors, "name", &form.name, "Name");
    require(&mut errors, "url", &form.url, "URL");

    if let RepositoryAuth::Basic { username, .. } = &form.auth {
        require(&mut errors, "auth.username", username, "Username");
        if !form.url.trim().is_empty() && !form.url.starts_with("https") {
            errors.add(
                "url",
                IssueKind::CrossFieldConstraint,
                "Basic authentication requires an https URL",
            );
        }
    }

    errors.finish()
}

/// Website form against the domain catalog.
///
/// `baseline` is the persisted value when the website already exists; a
/// domain bound elsewhere may only be kept, not newly chosen.
pub fn validate_website(
    form: &WebsiteForm,
    domains: &[AvailableDomain],
    baseline: Option<&CreateWebsiteInput>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();

    if form.domain.trim().is_empty() {
        errors.add("domain", IssueKind::MissingRequired, "Domain is required");
    } else {
        match domains.iter().find(|d| d.domain == form.domain) {
            None => {
                errors.add(
                    "domain",
                    IssueKind::CrossFieldConstraint,
                    format!("Domain {} is not available", form.domain),
                );
            }
            Some(domain) => check_domain_constraints(&mut errors, form, domain, baseline),
        }
    }

    if !form.path_prefix.starts_with('/') {
        errors.add(
            "pathPrefix",
            IssueKind::InvalidFormat,
            "Path prefix must start with '/'",
        );
    }

    if !(MIN_PORT..=MAX_PORT).contains(&form.http_port) {
        errors.add(
            "httpPort",
            IssueKind::OutOfRange,
            format!("Port must be between {} and {}", MIN_PORT, MAX_PORT),
        );
    }

    errors.finish()
}

fn check_domain_constraints(
    errors: &mut ValidationErrorBuilder,
    form: &WebsiteForm,
    domain: &AvailableDomain,
    baseline: Option<&CreateWebsiteInput>,
) {
    if domain.is_wildcard() {
        if form.subdomain.trim().is_empty() {
            errors.add(
                "subdomain",
                IssueKind::CrossFieldConstraint,
                "Subdomain is required for wildcard domains",
            );
        }
    } else if domain.already_bound {
        let fqdn = compose_fqdn(&form.subdomain, &form.domain);
        if baseline.map(|b| b.fqdn != fqdn).unwrap_or(true) {
            errors.add(
                "domain",
                IssueKind::CrossFieldConstraint,
                format!("Domain {} is already in use", domain.domain),
            );
        }
    }

    if form.authentication.requires_auth() && !domain.auth_available {
        errors.add(
            "authentication",
            IssueKind::CrossFieldConstraint,
            format!(
                "Authentication {} is not available for {}",
                form.authentication, domain.domain
            ),
        );
    }
}

/// Validate the records of a website working set that will be submitted.
///
/// Untouched persisted records are not re-checked against the catalog, but
/// every surviving record takes part in the (fqdn, path prefix) uniqueness
/// check.
pub fn validate_websites(
    records: &[WebsiteEditRecord],
    domains: &[AvailableDomain],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    let mut flagged: HashSet<usize> = HashSet::new();

    for (i, record) in records.iter().enumerate() {
        let prefix = format!("websites[{}]", i);
        let state = record.effective_state();
        if state == EditState::ReadyToDelete {
            continue;
        }

        if matches!(state, EditState::ReadyToChange | EditState::Added) {
            if let Err(e) = validate_website(&record.website, domains, record.baseline.as_ref()) {
                errors.merge_nested(&prefix, e);
            }
        }

        let Some(value) = record.submitted_value() else {
            continue;
        };
        let route = (value.fqdn.clone(), value.path_prefix.clone());
        if let Some(&first) = seen.get(&route) {
            let message = format!("{}{} is used by more than one website", route.0, route.1);
            if flagged.insert(first) {
                errors.add(
                    format!("websites[{}].pathPrefix", first),
                    IssueKind::DuplicateKey,
                    message.clone(),
                );
            }
            errors.add(
                format!("websites[{}].pathPrefix", i),
                IssueKind::DuplicateKey,
                message,
            );
        } else {
            seen.insert(route, i);
        }
    }

    errors.finish()
}

/// Indices of entries whose non-empty key appears more than once
pub fn find_duplicate_env_keys(vars: &[EnvVar]) -> Vec<usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for var in vars.iter().filter(|v| !v.key.is_empty()) {
        *counts.entry(var.key.as_str()).or_default() += 1;
    }
    vars.iter()
        .enumerate()
        .filter(|(_, v)| counts.get(v.key.as_str()).copied().unwrap_or(0) > 1)
        .map(|(i, _)| i)
        .collect()
}

/// Whether the last row is an untouched "add new" row
fn is_placeholder_row(index: usize, var: &EnvVar, len: usize) -> bool {
    index + 1 == len && !var.system && var.key.is_empty() && var.value.is_empty()
}

/// Validate the edited environment variable rows.
///
/// Every row but the last needs a key; the last row may be left completely
/// empty. Keys must be unique, including against system variables.
pub fn validate_env_vars(vars: &[EnvVar]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();

    for (i, var) in vars.iter().enumerate() {
        if var.system || is_placeholder_row(i, var, vars.len()) {
            continue;
        }
        let field = format!("envVars[{}].key", i);
        if var.key.is_empty() {
            errors.add(field, IssueKind::MissingRequired, "Key is required");
        } else if !ENV_KEY_REGEX.is_match(&var.key) {
            errors.add(
                field,
                IssueKind::InvalidFormat,
                "Key must contain only letters, digits and underscores, and not start with a digit",
            );
        }
    }

    for i in find_duplicate_env_keys(vars) {
        errors.add(
            format!("envVars[{}].key", i),
            IssueKind::DuplicateKey,
            format!("Duplicate key {}", vars[i].key),
        );
    }

    errors.finish()
}

/// Validate the rows and return them without the trailing placeholder row
pub fn prepare_env_submission(vars: &[EnvVar]) -> Result<Vec<EnvVar>, ValidationErrors> {
    validate_env_vars(vars)?;
    Ok(vars
        .iter()
        .enumerate()
        .filter(|(i, v)| !is_placeholder_row(*i, v, vars.len()))
        .map(|(_, v)| v.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthenticationType;

    fn catalog() -> Vec<AvailableDomain> {
        vec![
            AvailableDomain::new("*.trap.show").with_auth(true),
            AvailableDomain::new("example.com"),
            AvailableDomain::new("bound.com").with_already_bound(true),
        ]
    }

    fn keys(keys: &[&str]) -> Vec<EnvVar> {
        keys.iter().map(|k| EnvVar::new(*k, "")).collect()
    }

    #[test]
    fn test_duplicate_keys_flag_both() {
        let errors = validate_env_vars(&keys(&["A", "A"])).unwrap_err();
        assert!(errors.has("envVars[0].key", IssueKind::DuplicateKey));
        assert!(errors.has("envVars[1].key", IssueKind::DuplicateKey));
    }

    #[test]
    fn test_trailing_empty_row_is_placeholder() {
        let vars = keys(&["A", ""]);
        assert!(validate_env_vars(&vars).is_ok());
        assert_eq!(prepare_env_submission(&vars).unwrap(), keys(&["A"]));
    }

    #[test]
    fn test_empty_key_before_last_row() {
        let errors = validate_env_vars(&keys(&["", "B"])).unwrap_err();
        assert!(errors.has("envVars[0].key", IssueKind::MissingRequired));

        let mut vars = keys(&["A"]);
        vars.push(EnvVar::new("", "orphan value"));
        let errors = validate_env_vars(&vars).unwrap_err();
        assert!(errors.has("envVars[1].key", IssueKind::MissingRequired));
    }

    #[test]
    fn test_duplicate_with_system_key() {
        let vars = vec![EnvVar::system("NS_APP_ID", "x"), EnvVar::new("NS_APP_ID", "y")];
        let errors = validate_env_vars(&vars).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_env_key_format() {
        assert!(validate_env_vars(&keys(&["DATABASE_URL", "_private", "v2"])).is_ok());
        let errors = validate_env_vars(&keys(&["1BAD", "with-dash"])).unwrap_err();
        assert!(errors.has("envVars[0].key", IssueKind::InvalidFormat));
        assert!(errors.has("envVars[1].key", IssueKind::InvalidFormat));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("httpPort", " 8080 ").unwrap(), 8080);
        assert_eq!(parse_port("httpPort", "").unwrap_err().kind, IssueKind::MissingRequired);
        assert_eq!(parse_port("httpPort", "80a").unwrap_err().kind, IssueKind::InvalidFormat);
        assert_eq!(parse_port("httpPort", "70000").unwrap_err().kind, IssueKind::OutOfRange);
    }

    #[test]
    fn test_repository_basic_auth_requires_https() {
        let mut form = RepositoryForm {
            name: "app".to_string(),
            url: "http://git.example.com/app.git".to_string(),
            auth: RepositoryAuth::Basic {
                username: "user".to_string(),
                password: "pass".to_string(),
            },
        };
        let errors = validate_repository(&form).unwrap_err();
        assert!(errors.has("url", IssueKind::CrossFieldConstraint));

        form.url = "https://git.example.com/app.git".to_string();
        assert!(validate_repository(&form).is_ok());

        form.auth = RepositoryAuth::None;
        form.url = "http://git.example.com/app.git".to_string();
        assert!(validate_repository(&form).is_ok());
    }

    #[test]
    fn test_repository_required_fields() {
        let errors = validate_repository(&RepositoryForm::default()).unwrap_err();
        assert!(errors.has("name", IssueKind::MissingRequired));
        assert!(errors.has("url", IssueKind::MissingRequired));
    }

    #[test]
    fn test_wildcard_requires_subdomain() {
        let form = WebsiteForm::new("*.trap.show");
        let errors = validate_website(&form, &catalog(), None).unwrap_err();
        assert!(errors.has("subdomain", IssueKind::CrossFieldConstraint));
    }

    #[test]
    fn test_auth_requires_auth_available() {
        let mut form = WebsiteForm::new("example.com");
        form.authentication = AuthenticationType::Hard;
        let errors = validate_website(&form, &catalog(), None).unwrap_err();
        assert!(errors.has("authentication", IssueKind::CrossFieldConstraint));

        let mut form = WebsiteForm::new("*.trap.show");
        form.subdomain = "app".to_string();
        form.authentication = AuthenticationType::Soft;
        assert!(validate_website(&form, &catalog(), None).is_ok());
    }

    #[test]
    fn test_bound_domain_only_for_existing_website() {
        let form = WebsiteForm::new("bound.com");
        let errors = validate_website(&form, &catalog(), None).unwrap_err();
        assert!(errors.has("domain", IssueKind::CrossFieldConstraint));

        let baseline = CreateWebsiteInput {
            fqdn: "bound.com".to_string(),
            path_prefix: "/".to_string(),
            strip_prefix: false,
            https: true,
            h2c: false,
            http_port: 80,
            authentication: AuthenticationType::Off,
        };
        assert!(validate_website(&form, &catalog(), Some(&baseline)).is_ok());
    }

    #[test]
    fn test_unknown_domain_and_bad_fields() {
        let mut form = WebsiteForm::new("elsewhere.net");
        form.path_prefix = "api".to_string();
        form.http_port = 0;
        let errors = validate_website(&form, &catalog(), None).unwrap_err();
        assert!(errors.has("domain", IssueKind::CrossFieldConstraint));
        assert!(errors.has("pathPrefix", IssueKind::InvalidFormat));
        assert!(errors.has("httpPort", IssueKind::OutOfRange));
    }

    #[test]
    fn test_duplicate_routes() {
        let mut form = WebsiteForm::new("*.trap.show");
        form.subdomain = "app".to_string();
        let records = vec![
            WebsiteEditRecord::added(form.clone()),
            WebsiteEditRecord::added(form),
        ];
        let errors = validate_websites(&records, &catalog()).unwrap_err();
        assert!(errors.has("websites[0].pathPrefix", IssueKind::DuplicateKey));
        assert!(errors.has("websites[1].pathPrefix", IssueKind::DuplicateKey));
    }

    #[test]
    fn test_each_duplicate_route_flagged_once() {
        let mut form = WebsiteForm::new("*.trap.show");
        form.subdomain = "app".to_string();
        let records = vec![
            WebsiteEditRecord::added(form.clone()),
            WebsiteEditRecord::added(form.clone()),
            WebsiteEditRecord::added(form),
        ];
        let errors = validate_websites(&records, &catalog()).unwrap_err();
        assert_eq!(errors.len(), 3);
        for i in 0..3 {
            let field = format!("websites[{}].pathPrefix", i);
            let count = errors.issues().iter().filter(|e| e.field == field).count();
            assert_eq!(count, 1, "{}", field);
        }
    }
}
