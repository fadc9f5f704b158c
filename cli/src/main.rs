mod commands;
mod terminal;

use commands::{CommandLine, Commands, ping, scan};
use sweepr_common::config::Config;
use terminal::{logging, print};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);
    let cfg: Config = commands.config();
    print::banner(cfg.no_banner, cfg.quiet);

    if !is_root::is_root() {
        warn!("Not running as root; raw TCP, UDP and ICMP probes will likely fail");
    }

    match commands.command {
        Commands::Scan(args) => scan::scan(args, cfg).await,
        Commands::Ping(args) => ping::ping(args, cfg).await,
    }
}
