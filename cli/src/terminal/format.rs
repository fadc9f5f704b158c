use std::time::Duration;

use colored::*;
use sweepr_common::network::target::Target;
use sweepr_common::scan::{Liveness, ProbeResult, Protocol};

use crate::terminal::colors;

pub fn target(target: &Target) -> ColoredString {
    let color = if target.is_ipv4() {
        colors::IPV4_ADDR
    } else {
        colors::IPV6_ADDR
    };
    target.to_string().color(color)
}

pub fn liveness(liveness: Liveness) -> ColoredString {
    let label = liveness.to_string();
    match liveness {
        Liveness::Alive => label.green().bold(),
        Liveness::Unreachable => label.yellow().bold(),
        Liveness::Skipped => label.dimmed(),
    }
}

pub fn protocol(protocol: Protocol) -> ColoredString {
    let color = match protocol {
        Protocol::Tcp => colors::TCP,
        Protocol::Udp => colors::UDP,
    };
    protocol.to_string().color(color).bold()
}

/// `[port] is open (PROTOCOL)`
pub fn open_port(result: &ProbeResult) -> String {
    format!(
        "{}{}{} {} {}{}{}",
        "[".color(colors::SEPARATOR),
        result.port.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        "is open".color(colors::TEXT_DEFAULT),
        "(".color(colors::SEPARATOR),
        protocol(result.protocol),
        ")".color(colors::SEPARATOR),
    )
}

pub fn elapsed(elapsed: Duration) -> ColoredString {
    format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow()
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
    use sweepr_common::scan::PortState;

    #[test]
    fn open_port_line_matches_report_format() {
        colored::control::set_override(false);
        let result = ProbeResult::new(53, Protocol::Udp, PortState::Open);
        assert_eq!(open_port(&result), "[53] is open (UDP)");
    }

    #[test]
    fn elapsed_has_two_decimals() {
        colored::control::set_override(false);
        assert_eq!(elapsed(Duration::from_millis(1234)).to_string(), "1.23s");
    }
}
