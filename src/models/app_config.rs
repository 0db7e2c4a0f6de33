//! Application build/deploy configuration: wire shape and form shape.
//!
//! The wire shape is a single six-way tagged union carrying the union of the
//! deploy-axis and build-axis fields. The form shape keeps the two axes apart
//! so each can be chosen independently; either axis may be unset.

use serde::{Deserialize, Serialize};

/// Wire representation of an application's configuration.
///
/// `build_config` is `None` when the backend has not recorded a variant yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfig {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_build_config"
    )]
    pub build_config: Option<BuildConfigMessage>,
}

/// Tags of the six known wire variants
pub const BUILD_CONFIG_TAGS: [&str; 6] = [
    "runtimeBuildpack",
    "runtimeCmd",
    "runtimeDockerfile",
    "staticBuildpack",
    "staticCmd",
    "staticDockerfile",
];

fn deserialize_build_config<'de, D>(deserializer: D) -> Result<Option<BuildConfigMessage>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<serde_json::Value>::deserialize(deserializer)?
        .map(BuildConfigMessage::from_value)
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// The six valid `(deploy, build)` pairings as they travel over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BuildConfigMessage {
    #[serde(rename_all = "camelCase")]
    RuntimeBuildpack {
        #[serde(default)]
        use_mariadb: bool,
        #[serde(default)]
        use_mongodb: bool,
        #[serde(default)]
        entrypoint: String,
        #[serde(default)]
        command: String,
        #[serde(default)]
        context: String,
    },
    #[serde(rename_all = "camelCase")]
    RuntimeCmd {
        #[serde(default)]
        use_mariadb: bool,
        #[serde(default)]
        use_mongodb: bool,
        #[serde(default)]
        entrypoint: String,
        #[serde(default)]
        command: String,
        #[serde(default)]
        base_image: String,
        #[serde(default)]
        build_cmd: String,
    },
    #[serde(rename_all = "camelCase")]
    RuntimeDockerfile {
        #[serde(default)]
        use_mariadb: bool,
        #[serde(default)]
        use_mongodb: bool,
        #[serde(default)]
        entrypoint: String,
        #[serde(default)]
        command: String,
        #[serde(default)]
        dockerfile_name: String,
        #[serde(default)]
        context: String,
    },
    #[serde(rename_all = "camelCase")]
    StaticBuildpack {
        #[serde(default)]
        artifact_path: String,
        #[serde(default)]
        spa: bool,
        #[serde(default)]
        context: String,
    },
    #[serde(rename_all = "camelCase")]
    StaticCmd {
        #[serde(default)]
        artifact_path: String,
        #[serde(default)]
        spa: bool,
        #[serde(default)]
        base_image: String,
        #[serde(default)]
        build_cmd: String,
    },
    #[serde(rename_all = "camelCase")]
    StaticDockerfile {
        #[serde(default)]
        artifact_path: String,
        #[serde(default)]
        spa: bool,
        #[serde(default)]
        dockerfile_name: String,
        #[serde(default)]
        context: String,
    },
    /// Any tag outside the six above, as received. Never produced by this
    /// crate and cannot be serialized.
    #[serde(skip)]
    Unknown { tag: String },
}

impl BuildConfigMessage {
    /// Parse a wire variant, keeping an unrecognised tag in
    /// [`BuildConfigMessage::Unknown`] instead of failing.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match value.get("type").and_then(serde_json::Value::as_str) {
            Some(tag) if !BUILD_CONFIG_TAGS.contains(&tag) => Ok(Self::Unknown {
                tag: tag.to_string(),
            }),
            _ => serde_json::from_value(value),
        }
    }

    /// Wire tag of this variant
    pub fn tag(&self) -> &str {
        match self {
            Self::RuntimeBuildpack { .. } => "runtimeBuildpack",
            Self::RuntimeCmd { .. } => "runtimeCmd",
            Self::RuntimeDockerfile { .. } => "runtimeDockerfile",
            Self::StaticBuildpack { .. } => "staticBuildpack",
            Self::StaticCmd { .. } => "staticCmd",
            Self::StaticDockerfile { .. } => "staticDockerfile",
            Self::Unknown { tag } => tag,
        }
    }
}

/// Deploy axis: long-running process or statically served artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployType {
    Runtime,
    Static,
}

impl std::fmt::Display for DeployType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Runtime => write!(f, "runtime"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// Build axis: buildpack auto-detection, base image + command, or Dockerfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Buildpack,
    Cmd,
    Dockerfile,
}

impl std::fmt::Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buildpack => write!(f, "buildpack"),
            Self::Cmd => write!(f, "cmd"),
            Self::Dockerfile => write!(f, "dockerfile"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub use_mariadb: bool,
    pub use_mongodb: bool,
    pub entrypoint: String,
    pub command: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticConfig {
    pub artifact_path: String,
    pub spa: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeployConfig {
    Runtime(RuntimeConfig),
    Static(StaticConfig),
}

impl DeployConfig {
    pub fn deploy_type(&self) -> DeployType {
        match self {
            Self::Runtime(_) => DeployType::Runtime,
            Self::Static(_) => DeployType::Static,
        }
    }

    /// Empty value of the given type
    pub fn default_for(deploy_type: DeployType) -> Self {
        match deploy_type {
            DeployType::Runtime => Self::Runtime(RuntimeConfig::default()),
            DeployType::Static => Self::Static(StaticConfig::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum BuildConfig {
    Buildpack {
        context: String,
    },
    Cmd {
        base_image: String,
        build_cmd: String,
    },
    Dockerfile {
        dockerfile_name: String,
        context: String,
    },
}

impl BuildConfig {
    pub fn build_type(&self) -> BuildType {
        match self {
            Self::Buildpack { .. } => BuildType::Buildpack,
            Self::Cmd { .. } => BuildType::Cmd,
            Self::Dockerfile { .. } => BuildType::Dockerfile,
        }
    }

    /// Empty value of the given type
    pub fn default_for(build_type: BuildType) -> Self {
        match build_type {
            BuildType::Buildpack => Self::Buildpack {
                context: String::new(),
            },
            BuildType::Cmd => Self::Cmd {
                base_image: String::new(),
                build_cmd: String::new(),
            },
            BuildType::Dockerfile => Self::Dockerfile {
                dockerfile_name: String::new(),
                context: String::new(),
            },
        }
    }
}

/// Editable form of [`ApplicationConfig`]. `None` on an axis means the user
/// has not chosen it yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfigForm {
    #[serde(default)]
    pub deploy_config: Option<DeployConfig>,
    #[serde(default)]
    pub build_config: Option<BuildConfig>,
}

impl ApplicationConfigForm {
    /// Switch the deploy axis to `deploy_type`, keeping the current value if
    /// it already has that type.
    pub fn select_deploy_type(&mut self, deploy_type: DeployType) {
        match &self.deploy_config {
            Some(current) if current.deploy_type() == deploy_type => {}
            _ => self.deploy_config = Some(DeployConfig::default_for(deploy_type)),
        }
    }

    /// Switch the build axis to `build_type`, keeping the current value if
    /// it already has that type.
    pub fn select_build_type(&mut self, build_type: BuildType) {
        match &self.build_config {
            Some(current) if current.build_type() == build_type => {}
            _ => self.build_config = Some(BuildConfig::default_for(build_type)),
        }
    }
}
