use std::net::IpAddr;

use anyhow::{Context, bail};
use pnet::packet::Packet;
use pnet::packet::udp::{self, MutableUdpPacket, UdpPacket};

use crate::reply::{Inbound, Reply, ReplyKey};

pub const UDP_HDR_LEN: usize = 8;

/// Builds a UDP datagram with a valid checksum for the given address pair.
///
/// IPv6 makes the checksum mandatory, so it is always filled in.
pub fn create_packet(
    src: IpAddr,
    dst: IpAddr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> anyhow::Result<Vec<u8>> {
    let total_len: usize = UDP_HDR_LEN + payload.len();
    let length: u16 = u16::try_from(total_len).context("udp payload too large")?;
    let mut buffer: Vec<u8> = vec![0u8; total_len];
    {
        let mut datagram: MutableUdpPacket =
            MutableUdpPacket::new(&mut buffer).context("creating udp packet")?;
        datagram.set_source(src_port);
        datagram.set_destination(dst_port);
        datagram.set_length(length);
        datagram.set_payload(payload);

        let checksum: u16 = match (src, dst) {
            (IpAddr::V4(src), IpAddr::V4(dst)) => {
                udp::ipv4_checksum(&datagram.to_immutable(), &src, &dst)
            }
            (IpAddr::V6(src), IpAddr::V6(dst)) => {
                udp::ipv6_checksum(&datagram.to_immutable(), &src, &dst)
            }
            _ => bail!("{src} and {dst} belong to different address families"),
        };
        datagram.set_checksum(checksum);
    }
    Ok(buffer)
}

/// An empty probe datagram.
pub fn create_probe(src: IpAddr, dst: IpAddr, src_port: u16, dst_port: u16) -> anyhow::Result<Vec<u8>> {
    create_packet(src, dst, src_port, dst_port, &[])
}

pub fn parse_datagram(bytes: &[u8]) -> Option<Inbound> {
    let datagram: UdpPacket = UdpPacket::new(bytes)?;
    Some(Inbound {
        key: ReplyKey::Udp(datagram.get_source()),
        quoted_destination: None,
        local_port: Some(datagram.get_destination()),
        reply: Reply::Udp {
            payload_len: datagram.payload().len(),
        },
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
