//! A scripted host that answers probes with real wire bytes.
//!
//! Answers are built with `pnet`, parsed by the same parsers the raw transport
//! uses and matched through a [`ReplyRouter`], so only the sockets are fake.
//! IPv4 only.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::tcp::{MutableTcpPacket, TcpFlags};
use sweepr_core::network::router::ReplyRouter;
use sweepr_core::scanner::probe::{Probe, ProbeTransport};
use sweepr_protocols::{Inbound, Reply, icmp, tcp, udp};

pub const US: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
pub const LOCAL_TCP_PORT: u16 = 41_000;
pub const LOCAL_UDP_PORT: u16 = 42_000;

const ICMP_UNREACHABLE: u8 = 3;
const CODE_PORT_UNREACHABLE: u8 = 3;
const CODE_ADMIN_PROHIBITED: u8 = 13;

/// How a port reacts to a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Behavior {
    SynAck,
    Reset,
    /// A UDP datagram back, with this payload.
    Datagram(Vec<u8>),
    PortUnreachable,
    /// ICMP administratively prohibited, as a firewall would send.
    Prohibited,
    Silent,
}

type Parser = fn(&[u8]) -> Option<Inbound>;

pub struct SimulatedHost {
    target: Ipv4Addr,
    answers_echo: bool,
    tcp: HashMap<u16, Behavior>,
    udp: HashMap<u16, Behavior>,
    latency: Duration,
    router: ReplyRouter,
    sent: AtomicUsize,
}

impl SimulatedHost {
    /// A host that is silent on every port and ignores echo requests.
    pub fn new(target: Ipv4Addr) -> Self {
        Self {
            target,
            answers_echo: false,
            tcp: HashMap::new(),
            udp: HashMap::new(),
            latency: Duration::ZERO,
            router: ReplyRouter::new(IpAddr::V4(target), LOCAL_TCP_PORT, LOCAL_UDP_PORT),
            sent: AtomicUsize::new(0),
        }
    }

    pub fn answering_echo(mut self) -> Self {
        self.answers_echo = true;
        self
    }

    pub fn tcp(mut self, port: u16, behavior: Behavior) -> Self {
        self.tcp.insert(port, behavior);
        self
    }

    pub fn udp(mut self, port: u16, behavior: Behavior) -> Self {
        self.udp.insert(port, behavior);
        self
    }

    /// Delay before any answer, silence included.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn probes_sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    fn answer(&self, probe: Probe) -> anyhow::Result<Option<(Vec<u8>, Parser)>> {
        let (behavior, protocol, port) = match probe {
            Probe::Echo if self.answers_echo => return Ok(Some((echo_reply(), icmp::parse_icmp))),
            Probe::Echo => return Ok(None),
            Probe::TcpSyn(port) => (self.tcp.get(&port), IpNextHeaderProtocols::Tcp, port),
            Probe::Udp(port) => (self.udp.get(&port), IpNextHeaderProtocols::Udp, port),
        };

        let answer: (Vec<u8>, Parser) = match (behavior, probe) {
            (None | Some(Behavior::Silent), _) => return Ok(None),
            (Some(Behavior::SynAck), Probe::TcpSyn(_)) => {
                (tcp_segment(port, TcpFlags::SYN | TcpFlags::ACK)?, tcp::parse_segment)
            }
            (Some(Behavior::Reset), Probe::TcpSyn(_)) => {
                (tcp_segment(port, TcpFlags::RST | TcpFlags::ACK)?, tcp::parse_segment)
            }
            (Some(Behavior::Datagram(payload)), Probe::Udp(_)) => (
                udp::create_packet(
                    IpAddr::V4(self.target),
                    IpAddr::V4(US),
                    port,
                    LOCAL_UDP_PORT,
                    payload,
                )?,
                udp::parse_datagram,
            ),
            (Some(Behavior::PortUnreachable), _) => (
                self.icmp_error(CODE_PORT_UNREACHABLE, protocol, port)?,
                icmp::parse_icmp,
            ),
            (Some(Behavior::Prohibited), _) => (
                self.icmp_error(CODE_ADMIN_PROHIBITED, protocol, port)?,
                icmp::parse_icmp,
            ),
            (Some(behavior), probe) => bail!("{behavior:?} makes no sense for {probe:?}"),
        };
        Ok(Some(answer))
    }

    /// Destination unreachable quoting the IPv4 header and ports of our probe.
    fn icmp_error(
        &self,
        code: u8,
        protocol: IpNextHeaderProtocol,
        port: u16,
    ) -> anyhow::Result<Vec<u8>> {
        let local_port = if protocol == IpNextHeaderProtocols::Tcp {
            LOCAL_TCP_PORT
        } else {
            LOCAL_UDP_PORT
        };

        let mut bytes = vec![0u8; icmp::ICMP_HDR_LEN + 20 + 8];
        bytes[0] = ICMP_UNREACHABLE;
        bytes[1] = code;
        {
            let mut quoted = MutableIpv4Packet::new(&mut bytes[icmp::ICMP_HDR_LEN..])
                .context("creating quoted ipv4 header")?;
            quoted.set_version(4);
            quoted.set_header_length(5);
            quoted.set_total_length(28);
            quoted.set_ttl(64);
            quoted.set_next_level_protocol(protocol);
            quoted.set_source(US);
            quoted.set_destination(self.target);
        }
        let ports = icmp::ICMP_HDR_LEN + 20;
        bytes[ports..ports + 2].copy_from_slice(&local_port.to_be_bytes());
        bytes[ports + 2..ports + 4].copy_from_slice(&port.to_be_bytes());
        Ok(bytes)
    }
}

fn tcp_segment(port: u16, flags: u8) -> anyhow::Result<Vec<u8>> {
    let mut bytes = vec![0u8; tcp::TCP_HDR_LEN];
    {
        let mut segment =
            MutableTcpPacket::new(&mut bytes).context("creating tcp segment")?;
        segment.set_source(port);
        segment.set_destination(LOCAL_TCP_PORT);
        segment.set_data_offset(5);
        segment.set_flags(flags);
    }
    Ok(bytes)
}

fn echo_reply() -> Vec<u8> {
    vec![0u8; icmp::ICMP_HDR_LEN]
}

#[async_trait]
impl ProbeTransport for SimulatedHost {
    async fn exchange(&self, probe: Probe, timeout: Duration) -> anyhow::Result<Option<Reply>> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        let key = probe.reply_key();
        let waiter = self.router.register(key);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.answer(probe) {
            Ok(Some((bytes, parse))) => {
                if let Some(inbound) = parse(&bytes) {
                    self.router.deliver(IpAddr::V4(self.target), inbound);
                }
            }
            Ok(None) => {}
            Err(e) => {
                self.router.cancel(key);
                return Err(e);
            }
        }

        match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(reply)) => Ok(Some(reply)),
            _ => {
                self.router.cancel(key);
                Ok(None)
            }
        }
    }
}
