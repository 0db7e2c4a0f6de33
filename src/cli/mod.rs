//! Command-line interface for showcase-config.
//!
//! Provides subcommands for working with application documents offline:
//! - `check <file>` - Validate an application document and print its payload
//! - `resolve <fqdn>` - Split an fqdn into subdomain and domain
//! - `suggest-port <protocol>` - Suggest a publishable internet port
//! - `config check` - Validate configuration file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::engine::domain_resolver::resolve_host;
use crate::engine::port_range::{describe_ranges, suggest_port};
use crate::models::{ApplicationDocument, PortProtocol};
use crate::validation::{validate_document, CoreError};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "showcase-config")]
#[command(author, version, about = "Validate and convert deployment configuration", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "showcase.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an application document (JSON) and print the wire payload
    Check {
        /// Path to the document
        document: PathBuf,
    },

    /// Split an fqdn into subdomain and available domain
    Resolve {
        fqdn: String,
    },

    /// Suggest a random internet port for a protocol
    SuggestPort {
        /// tcp or udp
        #[arg(default_value = "tcp")]
        protocol: PortProtocol,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

/// Run a subcommand against the loaded configuration
pub fn run(command: &Commands, config: &Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Check { document } => check_document(config, document),
        Commands::Resolve { fqdn } => resolve(config, fqdn),
        Commands::SuggestPort { protocol } => {
            let port = suggest_port(*protocol, &config.system.ports);
            if port == 0 {
                tracing::warn!(protocol = %protocol, "No port ranges available");
            }
            println!("{}", port);
            Ok(())
        }
        Commands::Config(ConfigCommands::Check) => config_check(config, config_path),
    }
}

fn check_document(config: &Config, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    let document: ApplicationDocument = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse document: {}", path.display()))?;

    match validate_document(&document, &config.system) {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(CoreError::Validation(errors)) => {
            let mut grouped: Vec<_> = errors.by_field().into_iter().collect();
            grouped.sort();
            for (field, messages) in grouped {
                for message in messages {
                    eprintln!("  {}: {}", field, message);
                }
            }
            bail!("{} validation issue(s) in {}", errors.len(), path.display())
        }
        Err(e) => Err(e.into()),
    }
}

fn resolve(config: &Config, fqdn: &str) -> Result<()> {
    let host = resolve_host(fqdn, &config.system.domains, config.domains.unmatched)?;
    println!("{}", serde_json::to_string_pretty(&host)?);
    Ok(())
}

fn config_check(config: &Config, path: &Path) -> Result<()> {
    println!("Configuration OK: {}", path.display());
    println!("  Log level: {}", config.logging.level);
    println!("  Unmatched domains: {:?}", config.domains.unmatched);
    println!("  Domains: {}", config.system.domains.len());
    for domain in &config.system.domains {
        println!(
            "    {} (auth: {}, bound: {})",
            domain.domain, domain.auth_available, domain.already_bound
        );
    }
    for protocol in [PortProtocol::Tcp, PortProtocol::Udp] {
        let ranges = describe_ranges(protocol, &config.system.ports);
        if !ranges.is_empty() {
            println!("  {} ports: {}", protocol, ranges);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_command() {
        let cli = Cli::try_parse_from(["showcase-config", "check", "app.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Check { ref document } if document == Path::new("app.json")));
        assert_eq!(cli.config, PathBuf::from("showcase.toml"));
    }

    #[test]
    fn test_parse_suggest_port() {
        let cli = Cli::try_parse_from(["showcase-config", "-l", "debug", "suggest-port", "udp"])
            .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert!(matches!(
            cli.command,
            Commands::SuggestPort {
                protocol: PortProtocol::Udp
            }
        ));
        assert!(Cli::try_parse_from(["showcase-config", "suggest-port", "sctp"]).is_err());
    }

    #[test]
    fn test_check_document_reports_issues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, r#"{"name": ""}"#).unwrap();

        let err = check_document(&Config::default(), &path).unwrap_err();
        assert!(err.to_string().contains("validation issue(s)"));
    }
}
