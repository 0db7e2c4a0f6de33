//! Port publication models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortProtocol {
    #[default]
    Tcp,
    Udp,
}

impl std::fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "TCP"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

impl std::str::FromStr for PortProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            _ => Err(format!("Unknown protocol: {}", s)),
        }
    }
}

/// An application port exposed directly on the internet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortPublication {
    pub internet_port: i32,
    pub application_port: i32,
    #[serde(default)]
    pub protocol: PortProtocol,
}

/// Inclusive range of internet ports the platform allows publishing on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRange {
    #[serde(alias = "start_port")]
    pub start_port: i32,
    #[serde(alias = "end_port")]
    pub end_port: i32,
    pub protocol: PortProtocol,
}

impl PortRange {
    pub fn new(start_port: i32, end_port: i32, protocol: PortProtocol) -> Self {
        Self {
            start_port,
            end_port,
            protocol,
        }
    }

    pub fn contains(&self, port: i32) -> bool {
        self.start_port <= port && port <= self.end_port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!("tcp".parse::<PortProtocol>().unwrap(), PortProtocol::Tcp);
        assert_eq!("UDP".parse::<PortProtocol>().unwrap(), PortProtocol::Udp);
        assert!("sctp".parse::<PortProtocol>().is_err());
    }

    #[test]
    fn test_range_contains_inclusive() {
        let range = PortRange::new(39000, 39010, PortProtocol::Tcp);
        assert!(range.contains(39000));
        assert!(range.contains(39010));
        assert!(!range.contains(38999));
        assert!(!range.contains(39011));
    }
}
