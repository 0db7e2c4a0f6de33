//! Environment variable reconciliation.
//!
//! Compares the persisted variable set with the edited one and produces the
//! upserts and deletions that turn the former into the latter. System
//! variables and rows with an empty key never take part.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{EnvVar, EnvVarOperation};
use crate::validation::{CoreError, KeyFailure, Result};

/// Keys to add, delete and update, each sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvVarDiff {
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub updated: Vec<String>,
}

impl EnvVarDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.updated.is_empty()
    }

    /// Upserts for added and updated keys, then deletions.
    ///
    /// `new_vars` must be the map the diff was computed against.
    pub fn operations(&self, new_vars: &BTreeMap<String, String>) -> Vec<EnvVarOperation> {
        let upserts = self
            .added
            .iter()
            .chain(self.updated.iter())
            .filter_map(|key| {
                new_vars.get(key).map(|value| EnvVarOperation::Upsert {
                    key: key.clone(),
                    value: value.clone(),
                })
            });
        let deletes = self
            .deleted
            .iter()
            .map(|key| EnvVarOperation::Delete { key: key.clone() });
        upserts.chain(deletes).collect()
    }
}

/// Fold user-editable variables into a key -> value map. Later duplicates
/// overwrite earlier ones.
pub fn to_env_map(vars: &[EnvVar]) -> BTreeMap<String, String> {
    vars.iter()
        .filter(|v| !v.system && !v.key.is_empty())
        .map(|v| (v.key.clone(), v.value.clone()))
        .collect()
}

/// Diff two key -> value maps
pub fn diff_maps(old: &BTreeMap<String, String>, new: &BTreeMap<String, String>) -> EnvVarDiff {
    let mut diff = EnvVarDiff::default();

    for (key, value) in new {
        match old.get(key) {
            None => diff.added.push(key.clone()),
            Some(old_value) if old_value != value => diff.updated.push(key.clone()),
            Some(_) => {}
        }
    }
    diff.deleted = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .cloned()
        .collect();

    diff
}

/// Diff the persisted variables against the edited ones
pub fn reconcile(old_vars: &[EnvVar], new_vars: &[EnvVar]) -> EnvVarDiff {
    let diff = diff_maps(&to_env_map(old_vars), &to_env_map(new_vars));
    debug!(
        added = diff.added.len(),
        deleted = diff.deleted.len(),
        updated = diff.updated.len(),
        "Reconciled environment variables"
    );
    diff
}

/// Backend side of environment variable writes
pub trait EnvVarStore {
    fn upsert(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn delete(&mut self, key: &str) -> anyhow::Result<()>;
}

/// Reconcile and write the result to `store`.
///
/// Every operation is attempted; there is no rollback. Failed keys are
/// reported individually so the caller can retry just those.
pub fn apply_env_diff(
    old_vars: &[EnvVar],
    new_vars: &[EnvVar],
    store: &mut impl EnvVarStore,
) -> Result<EnvVarDiff> {
    let new_map = to_env_map(new_vars);
    let diff = diff_maps(&to_env_map(old_vars), &new_map);

    let mut failures = Vec::new();
    for op in diff.operations(&new_map) {
        let result = match &op {
            EnvVarOperation::Upsert { key, value } => store.upsert(key, value),
            EnvVarOperation::Delete { key } => store.delete(key),
        };
        if let Err(e) = result {
            warn!(key = %op.key(), error = %e, "Failed to apply environment variable change");
            failures.push(KeyFailure {
                key: op.key().to_string(),
                reason: format!("{:#}", e),
            });
        }
    }

    if failures.is_empty() {
        Ok(diff)
    } else {
        Err(CoreError::PartialFailure(failures))
    }
}
