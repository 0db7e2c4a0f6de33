//! Repository form model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum RepositoryAuth {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Ssh {
        #[serde(default)]
        key_id: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryForm {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub auth: RepositoryAuth,
}
