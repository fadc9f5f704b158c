//! ICMP and ICMPv6: the echo request used for liveness, and the error
//! messages that explain why a TCP or UDP probe was refused.

use std::net::{IpAddr, Ipv6Addr};

use anyhow::{Context, bail};
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::icmpv6::{self, Icmpv6Code, Icmpv6Packet, Icmpv6Types};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;

use crate::reply::{Inbound, Reply, ReplyKey, Unreachable};

pub const ICMP_HDR_LEN: usize = 8;
const ECHO_PAYLOAD: &[u8; 8] = b"sweepr\0\0";
pub const ECHO_REQ_LEN: usize = ICMP_HDR_LEN + ECHO_PAYLOAD.len();
const IP_V6_HDR_LEN: usize = 40;

// ICMPv4 message types
const V4_ECHO_REPLY: u8 = 0;
const V4_DEST_UNREACHABLE: u8 = 3;
const V4_SOURCE_QUENCH: u8 = 4;
const V4_REDIRECT: u8 = 5;
const V4_TIME_EXCEEDED: u8 = 11;
const V4_PARAMETER_PROBLEM: u8 = 12;
const V4_PORT_UNREACHABLE: u8 = 3;

// ICMPv6 message types
const V6_DEST_UNREACHABLE: u8 = 1;
const V6_PACKET_TOO_BIG: u8 = 2;
const V6_TIME_EXCEEDED: u8 = 3;
const V6_PARAMETER_PROBLEM: u8 = 4;
const V6_ECHO_REPLY: u8 = 129;
const V6_PORT_UNREACHABLE: u8 = 4;

/// Builds an echo request for the family of `dst`.
///
/// `src` only matters for ICMPv6, whose checksum covers the pseudo-header.
pub fn create_echo_request(
    src: IpAddr,
    dst: IpAddr,
    identifier: u16,
    sequence: u16,
) -> anyhow::Result<Vec<u8>> {
    match (src, dst) {
        (IpAddr::V4(_), IpAddr::V4(_)) => create_echo_request_v4(identifier, sequence),
        (IpAddr::V6(src), IpAddr::V6(dst)) => create_echo_request_v6(src, dst, identifier, sequence),
        _ => bail!("{src} and {dst} belong to different address families"),
    }
}

fn create_echo_request_v4(identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_REQ_LEN];
    {
        let mut echo = icmp::echo_request::MutableEchoRequestPacket::new(&mut buffer)
            .context("creating icmp echo request")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_payload(ECHO_PAYLOAD);
    }

    let checksum: u16 = {
        let packet = IcmpPacket::new(&buffer).context("reading icmp echo request")?;
        icmp::checksum(&packet)
    };
    let mut echo = icmp::echo_request::MutableEchoRequestPacket::new(&mut buffer)
        .context("creating icmp echo request")?;
    echo.set_checksum(checksum);

    Ok(buffer)
}

fn create_echo_request_v6(
    src: Ipv6Addr,
    dst: Ipv6Addr,
    identifier: u16,
    sequence: u16,
) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ECHO_REQ_LEN];
    {
        let mut echo = icmpv6::echo_request::MutableEchoRequestPacket::new(&mut buffer)
            .context("creating icmpv6 echo request")?;
        echo.set_icmpv6_type(Icmpv6Types::EchoRequest);
        echo.set_icmpv6_code(Icmpv6Code(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_payload(ECHO_PAYLOAD);
    }

    let checksum: u16 = {
        let packet = Icmpv6Packet::new(&buffer).context("reading icmpv6 echo request")?;
        icmpv6::checksum(&packet, &src, &dst)
    };
    let mut echo = icmpv6::echo_request::MutableEchoRequestPacket::new(&mut buffer)
        .context("creating icmpv6 echo request")?;
    echo.set_checksum(checksum);

    Ok(buffer)
}

/// Parses an ICMPv4 message. Requests and informational messages yield `None`.
pub fn parse_icmp(bytes: &[u8]) -> Option<Inbound> {
    let packet: IcmpPacket = IcmpPacket::new(bytes)?;
    let icmp_type: u8 = packet.get_icmp_type().0;
    let code: u8 = packet.get_icmp_code().0;

    match icmp_type {
        V4_ECHO_REPLY => Some(echo_inbound(Reply::Icmp { icmp_type })),
        V4_DEST_UNREACHABLE => {
            let kind = if code == V4_PORT_UNREACHABLE {
                Unreachable::Port
            } else {
                Unreachable::Other(code)
            };
            Some(quoting_inbound(bytes, Reply::Unreachable(kind), quoted_v4))
        }
        V4_SOURCE_QUENCH | V4_REDIRECT | V4_TIME_EXCEEDED | V4_PARAMETER_PROBLEM => {
            Some(quoting_inbound(bytes, Reply::Icmp { icmp_type }, quoted_v4))
        }
        _ => None,
    }
}

/// Parses an ICMPv6 message. Requests and neighbor discovery yield `None`.
pub fn parse_icmpv6(bytes: &[u8]) -> Option<Inbound> {
    let packet: Icmpv6Packet = Icmpv6Packet::new(bytes)?;
    let icmp_type: u8 = packet.get_icmpv6_type().0;
    let code: u8 = packet.get_icmpv6_code().0;

    match icmp_type {
        V6_ECHO_REPLY => Some(echo_inbound(Reply::Icmp { icmp_type })),
        V6_DEST_UNREACHABLE => {
            let kind = if code == V6_PORT_UNREACHABLE {
                Unreachable::Port
            } else {
                Unreachable::Other(code)
            };
            Some(quoting_inbound(bytes, Reply::Unreachable(kind), quoted_v6))
        }
        V6_PACKET_TOO_BIG | V6_TIME_EXCEEDED | V6_PARAMETER_PROBLEM => {
            Some(quoting_inbound(bytes, Reply::Icmp { icmp_type }, quoted_v6))
        }
        _ => None,
    }
}

/// Header fields of the datagram an ICMP error quotes back to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quoted {
    pub destination: IpAddr,
    pub protocol: IpNextHeaderProtocol,
    pub src_port: u16,
    pub dst_port: u16,
}

fn echo_inbound(reply: Reply) -> Inbound {
    Inbound {
        key: ReplyKey::Echo,
        local_port: None,
        quoted_destination: None,
        reply,
    }
}

/// Errors quoting one of our TCP/UDP probes are routed to that probe; the
/// rest still prove the host is up and go to the echo probe.
fn quoting_inbound(bytes: &[u8], reply: Reply, quoted: fn(&[u8]) -> Option<Quoted>) -> Inbound {
    let Some(quote) = bytes.get(ICMP_HDR_LEN..).and_then(quoted) else {
        return echo_inbound(reply);
    };

    let key: ReplyKey = if quote.protocol == IpNextHeaderProtocols::Tcp {
        ReplyKey::Tcp(quote.dst_port)
    } else if quote.protocol == IpNextHeaderProtocols::Udp {
        ReplyKey::Udp(quote.dst_port)
    } else {
        ReplyKey::Echo
    };

    Inbound {
        key,
        local_port: (key != ReplyKey::Echo).then_some(quote.src_port),
        quoted_destination: Some(quote.destination),
        reply,
    }
}

/// Reads the quoted IPv4 header plus the first four transport bytes.
pub fn quoted_v4(body: &[u8]) -> Option<Quoted> {
    let header: Ipv4Packet = Ipv4Packet::new(body)?;
    let header_len: usize = header.get_header_length() as usize * 4;
    let ports: &[u8] = body.get(header_len..header_len + 4)?;

    Some(Quoted {
        destination: IpAddr::V4(header.get_destination()),
        protocol: header.get_next_level_protocol(),
        src_port: u16::from_be_bytes([ports[0], ports[1]]),
        dst_port: u16::from_be_bytes([ports[2], ports[3]]),
    })
}

/// Extension headers are not walked; probes never carry any.
pub fn quoted_v6(body: &[u8]) -> Option<Quoted> {
    let header: Ipv6Packet = Ipv6Packet::new(body)?;
    let ports: &[u8] = body.get(IP_V6_HDR_LEN..IP_V6_HDR_LEN + 4)?;

    Some(Quoted {
        destination: IpAddr::V6(header.get_destination()),
        protocol: header.get_next_header(),
        src_port: u16::from_be_bytes([ports[0], ports[1]]),
        dst_port: u16::from_be_bytes([ports[2], ports[3]]),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
