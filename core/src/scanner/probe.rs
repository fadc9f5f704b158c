use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::scan::Protocol;
use sweepr_protocols::{Reply, ReplyKey};

/// One packet the scanner can put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    Echo,
    TcpSyn(u16),
    Udp(u16),
}

impl Probe {
    pub fn for_port(protocol: Protocol, port: u16) -> Self {
        match protocol {
            Protocol::Tcp => Probe::TcpSyn(port),
            Protocol::Udp => Probe::Udp(port),
        }
    }

    /// The key a reply to this probe is filed under.
    pub fn reply_key(&self) -> ReplyKey {
        match *self {
            Probe::Echo => ReplyKey::Echo,
            Probe::TcpSyn(port) => ReplyKey::Tcp(port),
            Probe::Udp(port) => ReplyKey::Udp(port),
        }
    }
}

/// Sends a probe to the scanned host and waits, bounded, for its answer.
///
/// `Ok(None)` means nothing relevant arrived within `timeout`. `Err` is a
/// failure to send at all; callers count it and move on.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn exchange(&self, probe: Probe, timeout: Duration) -> anyhow::Result<Option<Reply>>;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
