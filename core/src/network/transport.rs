use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pnet::{
    packet::{Packet, ip::IpNextHeaderProtocols},
    transport::{
        self, TransportChannelType, TransportProtocol, TransportReceiver, TransportSender,
    },
};
use tokio::sync::mpsc;
use tracing::debug;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportType {
    TcpLayer4,
    UdpLayer4,
    IcmpLayer4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

impl From<IpAddr> for Family {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }
}

/// A raw layer-4 socket: a shared sender, and a queue fed by a capture thread.
pub struct TransportHandle {
    pub transport_type: TransportType,
    pub family: Family,
    pub tx: Arc<Mutex<TransportSender>>,
    pub rx: mpsc::UnboundedReceiver<(Vec<u8>, IpAddr)>,
}

/// Owned layer-4 bytes that `TransportSender::send_to` accepts.
pub struct Layer4Bytes(pub Vec<u8>);

impl Packet for Layer4Bytes {
    fn packet(&self) -> &[u8] {
        &self.0
    }

    fn payload(&self) -> &[u8] {
        &self.0
    }
}

// The capture thread exits once the queue's receiver is dropped.
macro_rules! spawn_listener {
    ($tx:expr, $rx:expr, $iter_func:path) => {
        std::thread::spawn(move || {
            let mut iterator = $iter_func(&mut $rx);
            while !$tx.is_closed() {
                match iterator.next_with_timeout(POLL_INTERVAL) {
                    Ok(Some((packet, source_ip))) => {
                        if $tx.send((packet.packet().to_vec(), source_ip)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!("capture error: {e}");
                        std::thread::sleep(POLL_INTERVAL);
                    }
                }
            }
        })
    };
}

pub fn start_packet_capture(
    transport_type: TransportType,
    family: Family,
) -> anyhow::Result<TransportHandle> {
    let (tx, mut rx_socket) = open_channel(transport_type, family)?;
    let (queue_tx, queue_rx) = mpsc::unbounded_channel();

    match (transport_type, family) {
        (TransportType::TcpLayer4, _) => {
            spawn_listener!(queue_tx, rx_socket, pnet::transport::tcp_packet_iter)
        }
        (TransportType::UdpLayer4, _) => {
            spawn_listener!(queue_tx, rx_socket, pnet::transport::udp_packet_iter)
        }
        (TransportType::IcmpLayer4, Family::V4) => {
            spawn_listener!(queue_tx, rx_socket, pnet::transport::icmp_packet_iter)
        }
        (TransportType::IcmpLayer4, Family::V6) => {
            spawn_listener!(queue_tx, rx_socket, pnet::transport::icmpv6_packet_iter)
        }
    };

    Ok(TransportHandle {
        transport_type,
        family,
        tx: Arc::new(Mutex::new(tx)),
        rx: queue_rx,
    })
}

fn open_channel(
    transport_type: TransportType,
    family: Family,
) -> anyhow::Result<(TransportSender, TransportReceiver)> {
    let (tx, rx) =
        transport::transport_channel(TRANSPORT_BUFFER_SIZE, channel_type(transport_type, family))?;
    Ok((tx, rx))
}

fn channel_type(transport_type: TransportType, family: Family) -> TransportChannelType {
    let protocol = match (transport_type, family) {
        (TransportType::TcpLayer4, _) => IpNextHeaderProtocols::Tcp,
        (TransportType::UdpLayer4, _) => IpNextHeaderProtocols::Udp,
        (TransportType::IcmpLayer4, Family::V4) => IpNextHeaderProtocols::Icmp,
        (TransportType::IcmpLayer4, Family::V6) => IpNextHeaderProtocols::Icmpv6,
    };

    match family {
        Family::V4 => TransportChannelType::Layer4(TransportProtocol::Ipv4(protocol)),
        Family::V6 => TransportChannelType::Layer4(TransportProtocol::Ipv6(protocol)),
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
