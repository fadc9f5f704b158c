use std::sync::Arc;

use colored::*;
use sweepr_common::config::Config;
use sweepr_common::network::target::Target;
use sweepr_common::ports::{self, PortSpec, Selection};
use sweepr_common::scan::{Liveness, ScanReport};
use sweepr_common::success;
use sweepr_core::network::raw::RawTransport;
use sweepr_core::scanner;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::{colors, format, input::InputHandle, print, prompt, spinner::ScanSpinner};

pub async fn scan(args: ScanArgs, mut cfg: Config) -> anyhow::Result<()> {
    args.apply(&mut cfg);

    let target: Target = match args.target {
        Some(target) => target,
        None => prompt::target()?,
    };
    let selection: Selection = match args.ports {
        Some(selection) => selection,
        None => prompt::ports()?,
    };

    let ports: PortSpec = ports::resolve(&selection);
    if ports.is_empty() {
        warn!("No valid ports in the selection, nothing to probe");
    }

    print::header("starting scanner", cfg.quiet);
    info!(
        "Scanning {} on {} ports",
        format::target(&target),
        ports.len().to_string().bold()
    );

    let cancel = CancellationToken::new();
    watch_ctrl_c(cancel.clone());
    let input = (!cfg.disable_input).then(|| InputHandle::start(cancel.clone()));
    let spinner = ScanSpinner::start(ports.len(), input.is_some());

    let transport = Arc::new(RawTransport::open(target.addr()));
    let report = scanner::perform_scan(
        target,
        &ports,
        &cfg,
        transport,
        cancel,
        Some(spinner.progress_reporter()),
    )
    .await;

    drop(spinner);
    drop(input);

    scan_ends(&report?, &cfg);
    Ok(())
}

fn watch_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, waiting for probes in flight...");
            cancel.cancel();
        }
    });
}

fn scan_ends(report: &ScanReport, cfg: &Config) {
    if cfg.quiet > 0 {
        mprint!();
    }

    if report.interrupted {
        warn!(
            "Scan stopped early: {} of {} ports probed",
            report.stats.completed, report.stats.requested
        );
    }

    if report.is_empty() {
        no_open_ports(cfg);
    } else {
        print::header("open ports", cfg.quiet);
        for result in &report.open {
            print::print(&format::open_port(result));
        }
    }

    print_liveness(report);
    print_summary(report, cfg);
}

fn no_open_ports(cfg: &Config) {
    print::header("zero open ports", cfg.quiet);
    if cfg.quiet == 0 {
        print::no_results();
    }
}

fn print_liveness(report: &ScanReport) {
    match report.liveness {
        Liveness::Alive => success!(
            "{} is {}",
            format::target(&report.target),
            format::liveness(report.liveness)
        ),
        Liveness::Unreachable => warn!(
            "{} is {}; it may be down or dropping ICMP",
            format::target(&report.target),
            format::liveness(report.liveness)
        ),
        Liveness::Skipped => info!(
            "Liveness of {} {}",
            format::target(&report.target),
            format::liveness(report.liveness)
        ),
    }
}

fn print_summary(report: &ScanReport, cfg: &Config) {
    if report.stats.failed > 0 {
        warn!(
            "{} probes could not be sent; run as root for raw socket access",
            report.stats.failed
        );
    }

    let open_ports: ColoredString = format!("{} open ports", report.open.len()).bold().green();
    let output: ColoredString = format!(
        "Scan Complete: {open_ports} found in {}",
        format::elapsed(report.elapsed)
    )
    .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::aligned_line("Target", format::target(&report.target));
            print::aligned_line(
                "Probed",
                format!("{}/{} ports", report.stats.completed, report.stats.requested)
                    .color(colors::TEXT_DEFAULT),
            );
            print::aligned_line(
                "Failed",
                format!("{} probes", report.stats.failed).color(colors::TEXT_DEFAULT),
            );
            print::fat_separator();
            print::centerln(&output.to_string());
            print::end_of_program();
        }
        _ => success!("{}", output),
    }
}
