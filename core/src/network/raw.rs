//! [`ProbeTransport`] over raw layer-4 sockets.
//!
//! Three channels are opened per scan (TCP, UDP and ICMP of the target's
//! family). Each capture queue is drained by a task that parses what arrives
//! and hands it to the [`ReplyRouter`], which wakes the probe it answers.

use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pnet::transport::TransportSender;
use sweepr_common::ScanError;
use sweepr_protocols::{Inbound, Reply, icmp, tcp, udp};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::network::route;
use crate::network::router::ReplyRouter;
use crate::network::transport::{
    Family, Layer4Bytes, TransportHandle, TransportType, start_packet_capture,
};
use crate::scanner::probe::{Probe, ProbeTransport};

const EPHEMERAL_PORTS: std::ops::Range<u16> = 40_000..60_000;

type Parser = fn(&[u8]) -> Option<Inbound>;

pub struct RawTransport {
    target: IpAddr,
    channels: Result<Channels, String>,
}

struct Channels {
    source: IpAddr,
    tcp_port: u16,
    udp_port: u16,
    echo_id: u16,
    echo_seq: AtomicU16,
    tcp_tx: Arc<Mutex<TransportSender>>,
    udp_tx: Arc<Mutex<TransportSender>>,
    icmp_tx: Arc<Mutex<TransportSender>>,
    router: Arc<ReplyRouter>,
    _dispatchers: DropGuard,
}

impl RawTransport {
    /// Opens the raw channels for `target`. Must run inside a tokio runtime.
    ///
    /// Never fails: when the channels cannot be opened (usually missing
    /// privileges) the reason is kept and every exchange reports it, so the
    /// scan still finishes with each probe counted as failed.
    pub fn open(target: IpAddr) -> Self {
        let channels = Channels::open(target).map_err(|e| {
            warn!("Raw sockets unavailable: {e:#}");
            format!("{e:#}")
        });
        Self { target, channels }
    }

    pub fn is_ready(&self) -> bool {
        self.channels.is_ok()
    }
}

impl Channels {
    fn open(target: IpAddr) -> anyhow::Result<Self> {
        let source = route::source_addr_for(target)?;
        let family = Family::from(target);

        let tcp = start_packet_capture(TransportType::TcpLayer4, family)
            .context("opening raw TCP channel")?;
        let udp = start_packet_capture(TransportType::UdpLayer4, family)
            .context("opening raw UDP channel")?;
        let icmp = start_packet_capture(TransportType::IcmpLayer4, family)
            .context("opening raw ICMP channel")?;

        let tcp_port = rand::random_range(EPHEMERAL_PORTS);
        let udp_port = rand::random_range(EPHEMERAL_PORTS);
        let router = Arc::new(ReplyRouter::new(target, tcp_port, udp_port));
        let shutdown = CancellationToken::new();

        let icmp_parser: Parser = match family {
            Family::V4 => icmp::parse_icmp,
            Family::V6 => icmp::parse_icmpv6,
        };

        let tcp_tx = dispatch(tcp, tcp::parse_segment, &router, &shutdown);
        let udp_tx = dispatch(udp, udp::parse_datagram, &router, &shutdown);
        let icmp_tx = dispatch(icmp, icmp_parser, &router, &shutdown);

        debug!("Probing {target} from {source} (tcp:{tcp_port}, udp:{udp_port})");

        Ok(Self {
            source,
            tcp_port,
            udp_port,
            echo_id: rand::random(),
            echo_seq: AtomicU16::new(0),
            tcp_tx,
            udp_tx,
            icmp_tx,
            router,
            _dispatchers: shutdown.drop_guard(),
        })
    }

    fn craft(&self, target: IpAddr, probe: Probe) -> anyhow::Result<Vec<u8>> {
        match probe {
            Probe::Echo => {
                let sequence = self.echo_seq.fetch_add(1, Ordering::Relaxed);
                icmp::create_echo_request(self.source, target, self.echo_id, sequence)
            }
            Probe::TcpSyn(port) => tcp::create_syn_packet(self.source, target, self.tcp_port, port),
            Probe::Udp(port) => udp::create_probe(self.source, target, self.udp_port, port),
        }
    }

    fn sender(&self, probe: Probe) -> Arc<Mutex<TransportSender>> {
        match probe {
            Probe::Echo => self.icmp_tx.clone(),
            Probe::TcpSyn(_) => self.tcp_tx.clone(),
            Probe::Udp(_) => self.udp_tx.clone(),
        }
    }
}

/// Drains the capture queue of `handle` into `router` until `shutdown` fires.
fn dispatch(
    handle: TransportHandle,
    parse: Parser,
    router: &Arc<ReplyRouter>,
    shutdown: &CancellationToken,
) -> Arc<Mutex<TransportSender>> {
    let TransportHandle { tx, rx, transport_type, .. } = handle;
    let router = Arc::clone(router);
    let shutdown = shutdown.clone();

    tokio::spawn(async move {
        drain(rx, parse, &router, &shutdown).await;
        debug!("{transport_type:?} dispatcher stopped");
    });

    tx
}

async fn drain(
    mut rx: mpsc::UnboundedReceiver<(Vec<u8>, IpAddr)>,
    parse: Parser,
    router: &ReplyRouter,
    shutdown: &CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            next = rx.recv() => match next {
                Some((bytes, source)) => {
                    if let Some(inbound) = parse(&bytes) {
                        router.deliver(source, inbound);
                    }
                }
                None => break,
            },
        }
    }
}

#[async_trait]
impl ProbeTransport for RawTransport {
    async fn exchange(&self, probe: Probe, timeout: Duration) -> anyhow::Result<Option<Reply>> {
        let channels = self
            .channels
            .as_ref()
            .map_err(|reason| ScanError::Transport(reason.clone()))?;

        let packet = channels
            .craft(self.target, probe)
            .with_context(|| format!("crafting {probe:?}"))?;
        let sender = channels.sender(probe);
        let key = probe.reply_key();
        let target = self.target;

        let waiter = channels.router.register(key);

        let sent = tokio::task::spawn_blocking(move || {
            let mut tx = sender.lock().unwrap_or_else(PoisonError::into_inner);
            tx.send_to(Layer4Bytes(packet), target).map_err(ScanError::from)
        })
        .await;

        let sent: anyhow::Result<usize> = match sent {
            Ok(result) => result.map_err(anyhow::Error::from),
            Err(join_err) => Err(anyhow::Error::from(join_err)),
        };
        if let Err(e) = sent {
            channels.router.cancel(key);
            return Err(e.context(format!("sending {probe:?} to {target}")));
        }

        match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(reply)) => Ok(Some(reply)),
            Ok(Err(_)) => Ok(None),
            Err(_elapsed) => {
                channels.router.cancel(key);
                Ok(None)
            }
        }
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
    use std::net::Ipv4Addr;
    use sweepr_protocols::ReplyKey;

    const TARGET: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7));

    #[tokio::test]
    async fn drain_routes_parsed_packets() {
        let router = ReplyRouter::new(TARGET, 41_000, 42_000);
        let waiter = router.register(ReplyKey::Udp(53));
        let shutdown = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let datagram = udp::create_packet(TARGET, TARGET, 53, 42_000, b"dns").unwrap();
        tx.send((datagram, TARGET)).unwrap();
        drop(tx);

        drain(rx, udp::parse_datagram, &router, &shutdown).await;

        assert_eq!(waiter.await.unwrap(), Reply::Udp { payload_len: 3 });
    }

    #[tokio::test]
    async fn drain_stops_on_shutdown() {
        let router = ReplyRouter::new(TARGET, 41_000, 42_000);
        let shutdown = CancellationToken::new();
        let (_tx, rx) = mpsc::unbounded_channel();

        shutdown.cancel();
        drain(rx, tcp::parse_segment, &router, &shutdown).await;
    }

    #[tokio::test]
    #[ignore]
    async fn loopback_echo_is_answered_with_privileges() {
        let transport = RawTransport::open(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(transport.is_ready());

        let reply = transport
            .exchange(Probe::Echo, Duration::from_secs(1))
            .await
            .unwrap();
        assert!(reply.is_some());
    }
}
