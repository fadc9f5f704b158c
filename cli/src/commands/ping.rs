use sweepr_common::config::Config;
use sweepr_common::scan::Liveness;
use sweepr_common::success;
use sweepr_core::network::raw::RawTransport;
use sweepr_core::scanner::liveness;
use tracing::warn;

use crate::commands::PingArgs;
use crate::terminal::{format, print};

pub async fn ping(args: PingArgs, mut cfg: Config) -> anyhow::Result<()> {
    cfg.ping_timeout = args.ping.duration();
    print::header("sending echo request", cfg.quiet);

    let transport = RawTransport::open(args.target.addr());
    let status = liveness::probe(&transport, args.target, cfg.ping_timeout).await;

    match status {
        Liveness::Alive => success!(
            "{} is {}",
            format::target(&args.target),
            format::liveness(status)
        ),
        Liveness::Unreachable | Liveness::Skipped => warn!(
            "{} is {} within {}ms",
            format::target(&args.target),
            format::liveness(status),
            cfg.ping_timeout.as_millis()
        ),
    }
    Ok(())
}
