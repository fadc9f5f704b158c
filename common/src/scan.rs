//! Results produced while scanning a [`Target`] and the report assembled from them.

use std::fmt;
use std::time::Duration;

use crate::network::target::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
        }
    }
}

/// How a single probe was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortState {
    /// SYN+ACK for TCP, any datagram back for UDP.
    Open,
    /// Explicit rejection: RST for TCP, ICMP port-unreachable for UDP.
    Closed,
    /// An ICMP unreachable other than port-unreachable.
    Filtered,
    /// Nothing arrived before the timeout.
    NoResponse,
}

impl PortState {
    pub fn is_open(&self) -> bool {
        matches!(self, PortState::Open)
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PortState::Open => "open",
            PortState::Closed => "closed",
            PortState::Filtered => "filtered",
            PortState::NoResponse => "silent",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeResult {
    pub port: u16,
    pub protocol: Protocol,
    pub state: PortState,
}

impl ProbeResult {
    pub fn new(port: u16, protocol: Protocol, state: PortState) -> Self {
        Self {
            port,
            protocol,
            state,
        }
    }

    /// Identity used to enforce one result per (port, protocol).
    pub fn key(&self) -> (u16, Protocol) {
        (self.port, self.protocol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Unreachable,
    /// The echo probe was not sent.
    Skipped,
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Liveness::Alive => "online",
            Liveness::Unreachable => "not answering echo requests",
            Liveness::Skipped => "not checked",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Ports in the resolved spec.
    pub requested: usize,
    /// Ports whose TCP and UDP probes both finished.
    pub completed: usize,
    /// Probes that ended in a transport error instead of a classification.
    pub failed: usize,
}

/// Terminal artifact of a scan run.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub target: Target,
    pub liveness: Liveness,
    /// Open results only, TCP group first, ascending port within a group.
    pub open: Vec<ProbeResult>,
    pub stats: ScanStats,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn open_pairs(&self) -> Vec<(u16, Protocol)> {
        self.open.iter().map(ProbeResult::key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}
