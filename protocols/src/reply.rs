use std::net::IpAddr;

use sweepr_common::scan::PortState;

/// Which outstanding probe a reply answers. Ports are the target's ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyKey {
    Echo,
    Tcp(u16),
    Udp(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unreachable {
    /// ICMP type 3 code 3, ICMPv6 type 1 code 4.
    Port,
    /// Any other destination-unreachable code, carrying the raw code.
    Other(u8),
}

/// What came back for a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Tcp { flags: u8 },
    Udp { payload_len: usize },
    Unreachable(Unreachable),
    /// Echo reply, time exceeded and every other ICMP message.
    Icmp { icmp_type: u8 },
}

/// A parsed packet from the target, ready to be matched against a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inbound {
    pub key: ReplyKey,
    /// Our port the packet (or the datagram it quotes) was addressed to.
    pub local_port: Option<u16>,
    /// For ICMP errors, the destination of the datagram being quoted. Routers
    /// on the path may send these on the target's behalf.
    pub quoted_destination: Option<IpAddr>,
    pub reply: Reply,
}

const TCP_SYN: u8 = 0x02;
const TCP_RST: u8 = 0x04;
const TCP_ACK: u8 = 0x10;

pub fn classify_tcp(reply: Option<&Reply>) -> PortState {
    match reply {
        Some(Reply::Tcp { flags }) if flags & (TCP_SYN | TCP_ACK) == TCP_SYN | TCP_ACK => {
            PortState::Open
        }
        Some(Reply::Tcp { flags }) if flags & TCP_RST != 0 => PortState::Closed,
        Some(Reply::Unreachable(_)) | Some(Reply::Icmp { .. }) => PortState::Filtered,
        Some(Reply::Tcp { .. }) | Some(Reply::Udp { .. }) | None => PortState::NoResponse,
    }
}

/// Any datagram back from the port counts as open, whatever it carries.
pub fn classify_udp(reply: Option<&Reply>) -> PortState {
    match reply {
        Some(Reply::Udp { .. }) => PortState::Open,
        Some(Reply::Unreachable(Unreachable::Port)) => PortState::Closed,
        Some(Reply::Unreachable(Unreachable::Other(_))) | Some(Reply::Icmp { .. }) => {
            PortState::Filtered
        }
        Some(Reply::Tcp { .. }) | None => PortState::NoResponse,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_classification() {
        let syn_ack = Reply::Tcp { flags: TCP_SYN | TCP_ACK };
        let rst_ack = Reply::Tcp { flags: TCP_RST | TCP_ACK };
        let rst = Reply::Tcp { flags: TCP_RST };
        let ack = Reply::Tcp { flags: TCP_ACK };

        assert_eq!(classify_tcp(Some(&syn_ack)), PortState::Open);
        assert_eq!(classify_tcp(Some(&rst_ack)), PortState::Closed);
        assert_eq!(classify_tcp(Some(&rst)), PortState::Closed);
        assert_eq!(classify_tcp(Some(&ack)), PortState::NoResponse);
        assert_eq!(
            classify_tcp(Some(&Reply::Unreachable(Unreachable::Other(13)))),
            PortState::Filtered
        );
        assert_eq!(classify_tcp(None), PortState::NoResponse);
    }

    #[test]
    fn test_udp_classification() {
        assert_eq!(
            classify_udp(Some(&Reply::Udp { payload_len: 48 })),
            PortState::Open
        );
        assert_eq!(
            classify_udp(Some(&Reply::Unreachable(Unreachable::Port))),
            PortState::Closed
        );
        assert_eq!(
            classify_udp(Some(&Reply::Unreachable(Unreachable::Other(10)))),
            PortState::Filtered
        );
        assert_eq!(classify_udp(None), PortState::NoResponse);
    }

    /// Known limitation: an empty datagram from the port is indistinguishable
    /// from a real service answer and is reported open.
    #[test]
    fn test_udp_any_datagram_counts_as_open() {
        assert_eq!(
            classify_udp(Some(&Reply::Udp { payload_len: 0 })),
            PortState::Open
        );
    }
}
