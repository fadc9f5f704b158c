//! Matches replies captured on the raw sockets to the probe waiting for them.
//!
//! Each outstanding probe registers a one-shot slot under its [`ReplyKey`].
//! Capture queues call [`ReplyRouter::deliver`]; the first acceptable reply
//! for a key fills the slot and removes it, later ones are dropped.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};

use sweepr_protocols::{Inbound, Reply, ReplyKey};
use tokio::sync::oneshot;
use tracing::trace;

pub struct ReplyRouter {
    target: IpAddr,
    tcp_port: u16,
    udp_port: u16,
    pending: Mutex<HashMap<ReplyKey, oneshot::Sender<Reply>>>,
}

impl ReplyRouter {
    /// `tcp_port` and `udp_port` are the local source ports our probes use.
    pub fn new(target: IpAddr, tcp_port: u16, udp_port: u16) -> Self {
        Self {
            target,
            tcp_port,
            udp_port,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Must be called before the probe is sent, or a fast reply is lost.
    pub fn register(&self, key: ReplyKey) -> oneshot::Receiver<Reply> {
        let (tx, rx) = oneshot::channel();
        self.slots().insert(key, tx);
        rx
    }

    pub fn cancel(&self, key: ReplyKey) {
        self.slots().remove(&key);
    }

    pub fn pending(&self) -> usize {
        self.slots().len()
    }

    /// Returns whether the packet answered an outstanding probe.
    pub fn deliver(&self, source: IpAddr, inbound: Inbound) -> bool {
        if !self.is_from_target(source, &inbound) || !self.is_for_us(&inbound) {
            trace!("dropping unrelated packet from {source}: {inbound:?}");
            return false;
        }

        match self.slots().remove(&inbound.key) {
            Some(slot) => slot.send(inbound.reply).is_ok(),
            None => false,
        }
    }

    fn is_from_target(&self, source: IpAddr, inbound: &Inbound) -> bool {
        source == self.target || inbound.quoted_destination == Some(self.target)
    }

    fn is_for_us(&self, inbound: &Inbound) -> bool {
        match (inbound.key, inbound.local_port) {
            (ReplyKey::Tcp(_), Some(port)) => port == self.tcp_port,
            (ReplyKey::Udp(_), Some(port)) => port == self.udp_port,
            (ReplyKey::Tcp(_) | ReplyKey::Udp(_), None) => false,
            (ReplyKey::Echo, _) => true,
        }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<ReplyKey, oneshot::Sender<Reply>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
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
