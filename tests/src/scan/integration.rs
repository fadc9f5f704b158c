#![cfg(test)]
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use sweepr_common::config::Config;
use sweepr_common::network::target::Target;
use sweepr_common::ports::{self, PortSpec, Selection};
use sweepr_common::scan::{Liveness, PortState, Protocol, ScanReport};
use sweepr_core::scanner;
use tokio_util::sync::CancellationToken;

use crate::responder::{Behavior, SimulatedHost};

const HOST: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 9);

fn target() -> Target {
    Target::from(IpAddr::V4(HOST))
}

fn fast_config() -> Config {
    Config {
        no_banner: true,
        disable_input: true,
        probe_timeout: Duration::from_millis(20),
        ping_timeout: Duration::from_millis(20),
        ..Config::default()
    }
}

fn explicit(list: &str) -> PortSpec {
    ports::resolve(&Selection::Explicit(list.to_string()))
}

async fn sweep(host: SimulatedHost, ports: &PortSpec, cfg: &Config) -> ScanReport {
    scanner::perform_scan(
        target(),
        ports,
        cfg,
        Arc::new(host),
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn only_the_syn_ack_port_is_reported() {
    let host = SimulatedHost::new(HOST)
        .answering_echo()
        .tcp(22, Behavior::Reset)
        .tcp(80, Behavior::SynAck)
        .tcp(443, Behavior::Prohibited);

    let report = sweep(host, &explicit("22,80,443"), &fast_config()).await;

    assert_eq!(report.open_pairs(), vec![(80, Protocol::Tcp)]);
    assert_eq!(report.open[0].state, PortState::Open);
    assert_eq!(report.liveness, Liveness::Alive);
    assert_eq!(report.stats.completed, 3);
    assert!(!report.interrupted);
}

#[tokio::test]
async fn udp_payload_is_open_and_port_unreachable_is_not() {
    let host = SimulatedHost::new(HOST)
        .udp(53, Behavior::Datagram(b"\x12\x34\x81\x80".to_vec()))
        .udp(54, Behavior::PortUnreachable);

    let report = sweep(host, &explicit("53,54"), &fast_config()).await;

    assert_eq!(report.open_pairs(), vec![(53, Protocol::Udp)]);
}

#[tokio::test]
async fn any_udp_reply_counts_as_open() {
    let host = SimulatedHost::new(HOST)
        .udp(7, Behavior::Datagram(Vec::new()))
        .udp(9, Behavior::Prohibited);

    let report = sweep(host, &explicit("7,9"), &fast_config()).await;

    assert_eq!(report.open_pairs(), vec![(7, Protocol::Udp)]);
}

#[tokio::test]
async fn both_protocols_open_on_one_port_are_grouped() {
    let host = SimulatedHost::new(HOST)
        .tcp(53, Behavior::SynAck)
        .udp(53, Behavior::Datagram(b"ok".to_vec()))
        .tcp(22, Behavior::SynAck)
        .udp(123, Behavior::Datagram(b"ntp".to_vec()));

    let report = sweep(host, &explicit("123, 53, 22"), &fast_config()).await;

    assert_eq!(
        report.open_pairs(),
        vec![
            (22, Protocol::Tcp),
            (53, Protocol::Tcp),
            (53, Protocol::Udp),
            (123, Protocol::Udp),
        ]
    );
}

#[tokio::test]
async fn empty_selection_yields_empty_report() {
    let ports = explicit("");
    assert!(ports.is_empty());

    let cfg = Config {
        skip_ping: true,
        ..fast_config()
    };
    let host = Arc::new(SimulatedHost::new(HOST));
    let report = scanner::perform_scan(
        target(),
        &ports,
        &cfg,
        host.clone(),
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.stats.requested, 0);
    assert!(!report.interrupted);
    assert_eq!(report.liveness, Liveness::Skipped);
    assert_eq!(host.probes_sent(), 0);
}

#[tokio::test]
async fn silent_host_is_still_scanned() {
    let host = SimulatedHost::new(HOST).tcp(8080, Behavior::SynAck);

    let report = sweep(host, &explicit("8080"), &fast_config()).await;

    assert_eq!(report.liveness, Liveness::Unreachable);
    assert_eq!(report.open_pairs(), vec![(8080, Protocol::Tcp)]);
}

#[tokio::test]
async fn top100_sweep_probes_every_port_once() {
    let host = Arc::new(SimulatedHost::new(HOST));
    let ports = ports::resolve(&Selection::Top100);
    let cfg = Config {
        skip_ping: true,
        probe_timeout: Duration::from_millis(1),
        ..fast_config()
    };

    let report = scanner::perform_scan(
        target(),
        &ports,
        &cfg,
        host.clone(),
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.stats.completed, ports.len());
    assert_eq!(host.probes_sent(), ports.len() * 2);
}

#[tokio::test]
async fn cancelling_mid_flight_keeps_a_consistent_partial_report() {
    const WORKERS: usize = 4;
    let mut host = SimulatedHost::new(HOST).with_latency(Duration::from_millis(10));
    for port in 1..=200 {
        host = host.tcp(port, Behavior::SynAck);
    }
    let cfg = Config {
        skip_ping: true,
        concurrency: WORKERS,
        probe_timeout: Duration::from_millis(10),
        ..fast_config()
    };

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    let report = scanner::perform_scan(
        target(),
        &explicit("1-200"),
        &cfg,
        Arc::new(host),
        cancel,
        None,
    )
    .await
    .unwrap();

    assert!(report.interrupted);
    assert!(!report.is_empty());
    assert!(report.stats.completed < report.stats.requested);
    assert!(report.open.len() >= report.stats.completed);
    assert!(report.open.len() <= report.stats.completed + WORKERS);

    let unique: HashSet<(u16, Protocol)> = report.open_pairs().into_iter().collect();
    assert_eq!(unique.len(), report.open.len());
    assert!(report.open.iter().all(|r| r.protocol == Protocol::Tcp));
}

#[tokio::test]
async fn progress_is_reported_per_finished_port() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let on_progress: Arc<dyn Fn(usize) + Send + Sync> = Arc::new(move |done| {
        counter.fetch_max(done, Ordering::SeqCst);
    });

    let ports = explicit("1-25");
    let cfg = Config {
        skip_ping: true,
        ..fast_config()
    };
    scanner::perform_scan(
        target(),
        &ports,
        &cfg,
        Arc::new(SimulatedHost::new(HOST)),
        CancellationToken::new(),
        Some(on_progress),
    )
    .await
    .unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 25);
}

#[tokio::test]
#[ignore]
async fn raw_transport_finds_local_listener() {
    use sweepr_core::network::raw::RawTransport;

    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let transport = Arc::new(RawTransport::open(localhost));
    assert!(transport.is_ready(), "raw sockets need root");

    let ports: PortSpec = [port].into_iter().collect();
    let report = scanner::perform_scan(
        Target::from(localhost),
        &ports,
        &Config::default(),
        transport,
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.liveness, Liveness::Alive);
    assert!(report.open_pairs().contains(&(port, Protocol::Tcp)));
}
