use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::engine::domain_resolver::UnmatchedDomainPolicy;
use crate::models::SystemInfo;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub domains: DomainConfig,
    /// System info snapshot used by the command-line tools
    #[serde(default)]
    pub system: SystemInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomainConfig {
    /// What to do with an fqdn that matches no available domain (default: reject)
    #[serde(default)]
    pub unmatched: UnmatchedDomainPolicy,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PortProtocol;
    use std::io::Write;

    const SAMPLE: &str = r#"
[logging]
level = "debug"

[domains]
unmatched = "first_available"

[[system.domains]]
domain = "*.trap.show"
auth_available = true

[[system.domains]]
domain = "example.com"
already_bound = true

[[system.ports]]
start_port = 39000
end_port = 39999
protocol = "TCP"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.domains.unmatched, UnmatchedDomainPolicy::FirstAvailable);
        assert_eq!(config.system.domains.len(), 2);
        assert!(config.system.domains[0].auth_available);
        assert!(config.system.domains[1].already_bound);
        assert_eq!(config.system.ports[0].protocol, PortProtocol::Tcp);
        assert_eq!(config.system.ports[0].end_port, 39999);
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.domains.unmatched, UnmatchedDomainPolicy::Reject);
        assert!(config.system.domains.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.system.ports.len(), 1);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        assert!(Config::parse("[domains]\nunmatched = \"guess\"\n").is_err());
    }
}
