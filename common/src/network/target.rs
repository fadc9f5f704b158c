//! # Scan Target Model
//!
//! A scan runs against exactly one host. This module turns operator input into
//! that host's address, rejecting anything that is not a literal IPv4 or IPv6
//! address before a single packet leaves the machine.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::ScanError;

/// The validated address of the host being scanned.
///
/// Immutable once created; cheap to copy into every worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    addr: IpAddr,
}

impl Target {
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }
}

impl From<IpAddr> for Target {
    fn from(addr: IpAddr) -> Self {
        Self { addr }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)
    }
}

impl FromStr for Target {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

/// Parses a single IPv4 (dotted) or IPv6 (colon) address.
///
/// Hostnames, CIDR blocks, ranges and out-of-range octets are all rejected.
pub fn validate(candidate: &str) -> Result<Target, ScanError> {
    let trimmed: &str = candidate.trim();

    trimmed
        .parse::<IpAddr>()
        .map(Target::from)
        .map_err(|_| ScanError::InvalidAddress(candidate.to_string()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
