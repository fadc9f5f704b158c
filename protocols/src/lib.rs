//! Packet crafting and reply parsing for the probes the scanner sends.
//!
//! Builders return layer-4 bytes only; the kernel prepends the IP header.
//! Parsers take the layer-4 bytes a raw socket hands back and turn them into
//! an [`reply::Inbound`] the transport can route to the waiting probe.

pub mod icmp;
pub mod reply;
pub mod tcp;
pub mod udp;

pub use reply::{Inbound, Reply, ReplyKey, Unreachable};
