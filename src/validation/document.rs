//! End-to-end validation of an application document.

use tracing::debug;

use crate::engine::config_variant::to_message;
use crate::engine::domain_resolver::form_to_website;
use crate::engine::port_range::validate_port_publication;
use crate::engine::website_lifecycle::WebsiteEditRecord;
use crate::models::{ApplicationDocument, ApplicationPayload, SystemInfo};

use super::error::{CoreError, Result, ValidationErrorBuilder};
use super::rules::{prepare_env_submission, require, validate_repository, validate_websites};

/// Validate every part of `doc` against the system info and build the
/// submission payload. All issues are collected before failing.
pub fn validate_document(doc: &ApplicationDocument, system: &SystemInfo) -> Result<ApplicationPayload> {
    let mut errors = ValidationErrorBuilder::new();

    require(&mut errors, "name", &doc.name, "Name");

    if let Some(repository) = &doc.repository {
        if let Err(e) = validate_repository(repository) {
            errors.merge_nested("repository", e);
        }
    }

    let config = match to_message(&doc.config) {
        Ok(config) => Some(config),
        Err(CoreError::Validation(e)) => {
            errors.merge_nested("config", e);
            None
        }
        Err(e) => return Err(e),
    };

    if let Err(e) = validate_websites(&website_records(doc), &system.domains) {
        errors.extend(e.into_issues());
    }

    let env_vars = match prepare_env_submission(&doc.env_vars) {
        Ok(vars) => vars,
        Err(e) => {
            errors.extend(e.into_issues());
            Vec::new()
        }
    };

    for (i, publication) in doc.port_publications.iter().enumerate() {
        if let Err(e) = validate_port_publication(publication, &system.ports) {
            errors.merge_nested(&format!("portPublications[{}]", i), e);
        }
    }

    errors.finish()?;
    debug!(name = %doc.name, websites = doc.websites.len(), "Application document is valid");

    Ok(ApplicationPayload {
        name: doc.name.clone(),
        config: config.unwrap_or_default(),
        websites: doc.websites.iter().map(form_to_website).collect(),
        env_vars,
        port_publications: doc.port_publications.clone(),
    })
}

/// Pair each website form with the persisted website serving the same route,
/// if any; the rest are new.
fn website_records(doc: &ApplicationDocument) -> Vec<WebsiteEditRecord> {
    doc.websites
        .iter()
        .map(|form| {
            let input = form_to_website(form);
            doc.persisted_websites
                .iter()
                .find(|w| w.fqdn == input.fqdn && w.path_prefix == input.path_prefix)
                .map(|w| WebsiteEditRecord::persisted(w, form.clone()))
                .unwrap_or_else(|| WebsiteEditRecord::added(form.clone()))
        })
        .collect()
}
