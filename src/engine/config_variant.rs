//! Conversion between the two-axis form configuration and the flat six-way
//! wire configuration.

use tracing::debug;

use crate::models::{
    ApplicationConfig, ApplicationConfigForm, BuildConfig, BuildConfigMessage, DeployConfig,
    RuntimeConfig, StaticConfig,
};
use crate::validation::{
    CoreError, IssueKind, Result, ValidationErrorBuilder, ValidationErrors, ValidationIssue,
};

/// Split a wire configuration into its deploy and build axes.
///
/// An absent wire variant leaves both axes unset. An unknown tag is an
/// [`CoreError::UnreachableVariant`].
pub fn to_form(config: &ApplicationConfig) -> Result<ApplicationConfigForm> {
    let Some(message) = &config.build_config else {
        return Ok(ApplicationConfigForm::default());
    };

    let (deploy_config, build_config) = split_message(message)?;
    Ok(ApplicationConfigForm {
        deploy_config: Some(deploy_config),
        build_config: Some(build_config),
    })
}

fn split_message(message: &BuildConfigMessage) -> Result<(DeployConfig, BuildConfig)> {
    let split = match message.clone() {
        BuildConfigMessage::RuntimeBuildpack {
            use_mariadb,
            use_mongodb,
            entrypoint,
            command,
            context,
        } => (
            DeployConfig::Runtime(RuntimeConfig {
                use_mariadb,
                use_mongodb,
                entrypoint,
                command,
            }),
            BuildConfig::Buildpack { context },
        ),
        BuildConfigMessage::RuntimeCmd {
            use_mariadb,
            use_mongodb,
            entrypoint,
            command,
            base_image,
            build_cmd,
        } => (
            DeployConfig::Runtime(RuntimeConfig {
                use_mariadb,
                use_mongodb,
                entrypoint,
                command,
            }),
            BuildConfig::Cmd {
                base_image,
                build_cmd,
            },
        ),
        BuildConfigMessage::RuntimeDockerfile {
            use_mariadb,
            use_mongodb,
            entrypoint,
            command,
            dockerfile_name,
            context,
        } => (
            DeployConfig::Runtime(RuntimeConfig {
                use_mariadb,
                use_mongodb,
                entrypoint,
                command,
            }),
            BuildConfig::Dockerfile {
                dockerfile_name,
                context,
            },
        ),
        BuildConfigMessage::StaticBuildpack {
            artifact_path,
            spa,
            context,
        } => (
            DeployConfig::Static(StaticConfig { artifact_path, spa }),
            BuildConfig::Buildpack { context },
        ),
        BuildConfigMessage::StaticCmd {
            artifact_path,
            spa,
            base_image,
            build_cmd,
        } => (
            DeployConfig::Static(StaticConfig { artifact_path, spa }),
            BuildConfig::Cmd {
                base_image,
                build_cmd,
            },
        ),
        BuildConfigMessage::StaticDockerfile {
            artifact_path,
            spa,
            dockerfile_name,
            context,
        } => (
            DeployConfig::Static(StaticConfig { artifact_path, spa }),
            BuildConfig::Dockerfile {
                dockerfile_name,
                context,
            },
        ),
        BuildConfigMessage::Unknown { tag } => {
            return Err(CoreError::UnreachableVariant { tag })
        }
    };

    debug!(
        tag = message.tag(),
        deploy_type = %split.0.deploy_type(),
        build_type = %split.1.build_type(),
        "Split build config"
    );
    Ok(split)
}

/// Merge both axes into the wire configuration.
///
/// Refuses to run while either axis is unset or a required field of the
/// chosen variants is empty.
pub fn to_message(form: &ApplicationConfigForm) -> Result<ApplicationConfig> {
    validate_config_form(form)?;

    match (&form.deploy_config, &form.build_config) {
        (Some(deploy_config), Some(build_config)) => Ok(ApplicationConfig {
            build_config: Some(merge_axes(deploy_config.clone(), build_config.clone())),
        }),
        (None, _) => Err(ValidationErrors::from(unresolved_deploy()).into()),
        (_, None) => Err(ValidationErrors::from(unresolved_build()).into()),
    }
}

fn merge_axes(deploy_config: DeployConfig, build_config: BuildConfig) -> BuildConfigMessage {
    match (deploy_config, build_config) {
        (DeployConfig::Runtime(runtime), BuildConfig::Buildpack { context }) => {
            BuildConfigMessage::RuntimeBuildpack {
                use_mariadb: runtime.use_mariadb,
                use_mongodb: runtime.use_mongodb,
                entrypoint: runtime.entrypoint,
                command: runtime.command,
                context,
            }
        }
        (
            DeployConfig::Runtime(runtime),
            BuildConfig::Cmd {
                base_image,
                build_cmd,
            },
        ) => BuildConfigMessage::RuntimeCmd {
            use_mariadb: runtime.use_mariadb,
            use_mongodb: runtime.use_mongodb,
            entrypoint: runtime.entrypoint,
            command: runtime.command,
            base_image,
            build_cmd,
        },
        (
            DeployConfig::Runtime(runtime),
            BuildConfig::Dockerfile {
                dockerfile_name,
                context,
            },
        ) => BuildConfigMessage::RuntimeDockerfile {
            use_mariadb: runtime.use_mariadb,
            use_mongodb: runtime.use_mongodb,
            entrypoint: runtime.entrypoint,
            command: runtime.command,
            dockerfile_name,
            context,
        },
        (DeployConfig::Static(st), BuildConfig::Buildpack { context }) => {
            BuildConfigMessage::StaticBuildpack {
                artifact_path: st.artifact_path,
                spa: st.spa,
                context,
            }
        }
        (
            DeployConfig::Static(st),
            BuildConfig::Cmd {
                base_image,
                build_cmd,
            },
        ) => BuildConfigMessage::StaticCmd {
            artifact_path: st.artifact_path,
            spa: st.spa,
            base_image,
            build_cmd,
        },
        (
            DeployConfig::Static(st),
            BuildConfig::Dockerfile {
                dockerfile_name,
                context,
            },
        ) => BuildConfigMessage::StaticDockerfile {
            artifact_path: st.artifact_path,
            spa: st.spa,
            dockerfile_name,
            context,
        },
    }
}

fn unresolved_deploy() -> ValidationIssue {
    ValidationIssue::new(
        "deployConfig",
        IssueKind::UnresolvedVariant,
        "Select deploy type",
    )
}

fn unresolved_build() -> ValidationIssue {
    ValidationIssue::new(
        "buildConfig",
        IssueKind::UnresolvedVariant,
        "Select build type",
    )
}

/// Field-level checks on a configuration form: both axes chosen, artifact
/// path set for static deploys, Dockerfile name set for Dockerfile builds.
pub fn validate_config_form(form: &ApplicationConfigForm) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();

    match &form.deploy_config {
        None => {
            errors.push(unresolved_deploy());
        }
        Some(DeployConfig::Static(st)) if st.artifact_path.trim().is_empty() => {
            errors.add(
                "deployConfig.artifactPath",
                IssueKind::MissingRequired,
                "Artifact path is required",
            );
        }
        Some(_) => {}
    }

    match &form.build_config {
        None => {
            errors.push(unresolved_build());
        }
        Some(BuildConfig::Dockerfile {
            dockerfile_name, ..
        }) if dockerfile_name.trim().is_empty() => {
            errors.add(
                "buildConfig.dockerfileName",
                IssueKind::MissingRequired,
                "Dockerfile name is required",
            );
        }
        Some(_) => {}
    }

    errors.finish()
}
