use std::net::IpAddr;

use anyhow::{Context, bail};
use pnet::packet::tcp::{self, MutableTcpPacket, TcpFlags, TcpPacket};

use crate::reply::{Inbound, Reply, ReplyKey};

pub const TCP_HDR_LEN: usize = 20;
const SYN_WINDOW: u16 = 1024;

/// Builds a bare SYN segment (no options) with a random sequence number.
///
/// `src` must be the address the kernel will stamp on the IP header, since it
/// is part of the checksum pseudo-header.
pub fn create_syn_packet(
    src: IpAddr,
    dst: IpAddr,
    src_port: u16,
    dst_port: u16,
) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; TCP_HDR_LEN];
    {
        let mut segment: MutableTcpPacket =
            MutableTcpPacket::new(&mut buffer).context("creating tcp packet")?;
        segment.set_source(src_port);
        segment.set_destination(dst_port);
        segment.set_sequence(rand::random::<u32>());
        segment.set_acknowledgement(0);
        segment.set_data_offset(5);
        segment.set_flags(TcpFlags::SYN);
        segment.set_window(SYN_WINDOW);
        segment.set_urgent_ptr(0);

        let checksum: u16 = match (src, dst) {
            (IpAddr::V4(src), IpAddr::V4(dst)) => {
                tcp::ipv4_checksum(&segment.to_immutable(), &src, &dst)
            }
            (IpAddr::V6(src), IpAddr::V6(dst)) => {
                tcp::ipv6_checksum(&segment.to_immutable(), &src, &dst)
            }
            _ => bail!("{src} and {dst} belong to different address families"),
        };
        segment.set_checksum(checksum);
    }
    Ok(buffer)
}

pub fn parse_segment(bytes: &[u8]) -> Option<Inbound> {
    let segment: TcpPacket = TcpPacket::new(bytes)?;
    Some(Inbound {
        key: ReplyKey::Tcp(segment.get_source()),
        quoted_destination: None,
        local_port: Some(segment.get_destination()),
        reply: Reply::Tcp {
            flags: segment.get_flags(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    const SRC_V4: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
    const DST_V4: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 9);

    #[test]
    fn syn_packet_has_expected_header() {
        let bytes = create_syn_packet(SRC_V4.into(), DST_V4.into(), 40_000, 443).unwrap();
        assert_eq!(bytes.len(), TCP_HDR_LEN);

        let segment = TcpPacket::new(&bytes).unwrap();
        assert_eq!(segment.get_source(), 40_000);
        assert_eq!(segment.get_destination(), 443);
        assert_eq!(segment.get_flags(), TcpFlags::SYN);
        assert_eq!(segment.get_data_offset(), 5);
        assert_eq!(
            segment.get_checksum(),
            tcp::ipv4_checksum(&segment, &SRC_V4, &DST_V4)
        );
    }

    #[test]
    fn syn_packet_supports_ipv6() {
        let src = Ipv6Addr::LOCALHOST;
        let dst = Ipv6Addr::LOCALHOST;
        let bytes = create_syn_packet(src.into(), dst.into(), 40_000, 22).unwrap();
        let segment = TcpPacket::new(&bytes).unwrap();
        assert_eq!(segment.get_checksum(), tcp::ipv6_checksum(&segment, &src, &dst));
    }

    #[test]
    fn syn_packet_rejects_mixed_families() {
        let result = create_syn_packet(SRC_V4.into(), Ipv6Addr::LOCALHOST.into(), 1, 2);
        assert!(result.is_err());
    }

    #[test]
    fn parse_segment_reads_ports_and_flags() {
        let mut bytes = vec![0u8; TCP_HDR_LEN];
        {
            let mut segment = MutableTcpPacket::new(&mut bytes).unwrap();
            segment.set_source(80);
            segment.set_destination(40_000);
            segment.set_data_offset(5);
            segment.set_flags(TcpFlags::SYN | TcpFlags::ACK);
        }

        let inbound = parse_segment(&bytes).unwrap();
        assert_eq!(inbound.key, ReplyKey::Tcp(80));
        assert_eq!(inbound.local_port, Some(40_000));
        assert_eq!(
            inbound.reply,
            Reply::Tcp {
                flags: TcpFlags::SYN | TcpFlags::ACK
            }
        );
    }

    #[test]
    fn parse_segment_rejects_truncated_input() {
        assert!(parse_segment(&[0u8; 12]).is_none());
    }
}
