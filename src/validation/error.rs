//! Error types for the configuration core.
//!
//! User-correctable problems are reported as field-scoped [`ValidationIssue`]s
//! and collected with a [`ValidationErrorBuilder`]. Everything else is a
//! [`CoreError`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Category of a field-level validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Empty required field
    MissingRequired,
    /// Deploy or build axis not chosen
    UnresolvedVariant,
    /// A rule spanning several fields is violated
    CrossFieldConstraint,
    /// Numeric value outside the allowed ranges
    OutOfRange,
    /// Key repeated within a collection
    DuplicateKey,
    /// Value present but malformed
    InvalidFormat,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingRequired => "missing_required",
            IssueKind::UnresolvedVariant => "unresolved_variant",
            IssueKind::CrossFieldConstraint => "cross_field_constraint",
            IssueKind::OutOfRange => "out_of_range",
            IssueKind::DuplicateKey => "duplicate_key",
            IssueKind::InvalidFormat => "invalid_format",
        }
    }
}

/// A problem attached to a field path such as `websites[0].subdomain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// Same issue re-rooted under `prefix`, e.g. `subdomain` -> `websites[2].subdomain`
    pub fn nested(mut self, prefix: &str) -> Self {
        self.field = format!("{}.{}", prefix, self.field);
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty set of validation issues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Whether any issue is attached to `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }

    /// Whether any issue of `kind` is attached to `field`
    pub fn has(&self, field: &str, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.field == field && i.kind == kind)
    }

    /// Messages grouped by field, ready for rendering next to inputs
    pub fn by_field(&self) -> HashMap<String, Vec<String>> {
        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for issue in &self.issues {
            grouped
                .entry(issue.field.clone())
                .or_default()
                .push(issue.message.clone());
        }
        grouped
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.issues.len() == 1 {
            write!(f, "{}", self.issues[0])
        } else {
            write!(f, "Validation failed for {} fields", self.by_field().len())
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationIssue> for ValidationErrors {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

/// Builder for collecting multiple validation issues
#[derive(Debug, Default)]
pub struct ValidationErrorBuilder {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue for a field
    pub fn add(
        &mut self,
        field: impl Into<String>,
        kind: IssueKind,
        message: impl Into<String>,
    ) -> &mut Self {
        self.issues.push(ValidationIssue::new(field, kind, message));
        self
    }

    pub fn push(&mut self, issue: ValidationIssue) -> &mut Self {
        self.issues.push(issue);
        self
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) -> &mut Self {
        self.issues.extend(issues);
        self
    }

    /// Merge issues from a failed sub-validation, re-rooted under `prefix`
    pub fn merge_nested(&mut self, prefix: &str, errors: ValidationErrors) -> &mut Self {
        self.issues
            .extend(errors.into_issues().into_iter().map(|i| i.nested(prefix)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn build(self) -> Option<ValidationErrors> {
        if self.issues.is_empty() {
            None
        } else {
            Some(ValidationErrors {
                issues: self.issues,
            })
        }
    }

    /// Return Ok(()) if no issues were collected
    pub fn finish(self) -> std::result::Result<(), ValidationErrors> {
        match self.build() {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }
}

/// One key that could not be written while applying an env var diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFailure {
    pub key: String,
    pub reason: String,
}

impl std::fmt::Display for KeyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.key, self.reason)
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// A wire tag outside the known set. This is a programming error on the
    /// producing side and is never coerced into a known variant.
    #[error("Unreachable build config variant: {tag}")]
    UnreachableVariant { tag: String },

    #[error("No available domain matches {fqdn}")]
    DomainNotFound { fqdn: String },

    #[error("No domains are available")]
    NoDomainsAvailable,

    #[error("No website record at index {index}")]
    RecordNotFound { index: usize },

    #[error("Failed to apply {} environment variable change(s): {}", .0.len(), join_failures(.0))]
    PartialFailure(Vec<KeyFailure>),
}

fn join_failures(failures: &[KeyFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, CoreError>;
