//! Port publication range checks and port suggestion.

use rand::Rng;

use crate::models::{PortProtocol, PortPublication, PortRange};
use crate::validation::{IssueKind, ValidationErrorBuilder, ValidationErrors};

/// Lowest and highest valid TCP/UDP port
const MIN_PORT: i32 = 1;
const MAX_PORT: i32 = 65535;

/// Whether `port` lies in some range (bounds inclusive) of the same protocol
pub fn is_valid_port(port: i32, protocol: PortProtocol, ranges: &[PortRange]) -> bool {
    ranges
        .iter()
        .filter(|r| r.protocol == protocol)
        .any(|r| r.contains(port))
}

/// Suggest a random publishable port for `protocol`, or 0 when no range
/// allows that protocol.
pub fn suggest_port(protocol: PortProtocol, ranges: &[PortRange]) -> i32 {
    suggest_port_with(&mut rand::rng(), protocol, ranges)
}

/// [`suggest_port`] with a caller-supplied RNG. A range is picked uniformly,
/// then a port uniformly within it.
pub fn suggest_port_with<R: Rng + ?Sized>(
    rng: &mut R,
    protocol: PortProtocol,
    ranges: &[PortRange],
) -> i32 {
    let candidates: Vec<&PortRange> = ranges
        .iter()
        .filter(|r| r.protocol == protocol && r.start_port <= r.end_port)
        .collect();
    if candidates.is_empty() {
        return 0;
    }

    let range = candidates[rng.random_range(0..candidates.len())];
    rng.random_range(range.start_port..=range.end_port)
}

/// Human-readable list of ranges for `protocol`, e.g. `39000-39999, 40000-40010`
pub fn describe_ranges(protocol: PortProtocol, ranges: &[PortRange]) -> String {
    ranges
        .iter()
        .filter(|r| r.protocol == protocol)
        .map(|r| format!("{}-{}", r.start_port, r.end_port))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check one port publication against the available ranges
pub fn validate_port_publication(
    publication: &PortPublication,
    ranges: &[PortRange],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrorBuilder::new();

    if !is_valid_port(publication.internet_port, publication.protocol, ranges) {
        let allowed = describe_ranges(publication.protocol, ranges);
        let message = if allowed.is_empty() {
            format!("No {} ports are available", publication.protocol)
        } else {
            format!(
                "Internet port must be within the available {} ranges: {}",
                publication.protocol, allowed
            )
        };
        errors.add("internetPort", IssueKind::OutOfRange, message);
    }

    if !(MIN_PORT..=MAX_PORT).contains(&publication.application_port) {
        errors.add(
            "applicationPort",
            IssueKind::OutOfRange,
            format!("Port must be between {} and {}", MIN_PORT, MAX_PORT),
        );
    }

    errors.finish()
}
