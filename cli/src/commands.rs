pub mod ping;
pub mod scan;

use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use sweepr_common::config::{Config, DEFAULT_CONCURRENCY};
use sweepr_common::network::target::Target;
use sweepr_common::ports::Selection;

#[derive(Parser)]
#[command(name = "sweepr", version)]
#[command(about = "Finds open TCP and UDP ports on a single host.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output; repeat to print results only
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output; repeat for trace level
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Do not listen for the 'q' key during a scan
    #[arg(long, global = true)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every selected port of a host over TCP and UDP
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Check whether a host answers echo requests
    #[command(alias = "p")]
    Ping(PingArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// IPv4 or IPv6 address; prompted for when omitted
    pub target: Option<Target>,

    /// Ports to probe: "22,80,443", "1-1024", "top100" or "all"; prompted for when omitted
    #[arg(short, long, value_name = "SELECTION")]
    pub ports: Option<Selection>,

    /// Probe workers running at once (1-4096)
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// How long each TCP or UDP probe waits for a reply
    #[arg(long = "timeout", value_name = "MS", default_value_t = 1000)]
    pub timeout_ms: u64,

    #[command(flatten)]
    pub ping: PingTimeout,

    /// Do not send the echo request before scanning
    #[arg(long)]
    pub skip_ping: bool,
}

#[derive(Args)]
pub struct PingArgs {
    pub target: Target,

    #[command(flatten)]
    pub ping: PingTimeout,
}

#[derive(Args)]
pub struct PingTimeout {
    /// How long the echo request waits for a reply
    #[arg(long = "ping-timeout", value_name = "MS", default_value_t = 1000)]
    pub ping_timeout_ms: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Settings shared by every subcommand.
    pub fn config(&self) -> Config {
        Config {
            no_banner: self.no_banner,
            quiet: self.quiet,
            disable_input: self.no_input,
            ..Config::default()
        }
    }
}

impl ScanArgs {
    pub fn apply(&self, cfg: &mut Config) {
        cfg.concurrency = self.concurrency;
        cfg.probe_timeout = Duration::from_millis(self.timeout_ms);
        cfg.ping_timeout = self.ping.duration();
        cfg.skip_ping = self.skip_ping;
    }
}

impl PingTimeout {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
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
