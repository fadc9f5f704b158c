use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 256;
pub const MAX_CONCURRENCY: usize = 4_096;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Config {
    pub no_banner: bool,
    /// 0 prints everything, 1 drops decorations, 2 prints only results.
    pub quiet: u8,
    /// Disables the `q` key listener used to stop a scan early.
    pub disable_input: bool,
    /// Upper bound on probe workers running at the same time.
    pub concurrency: usize,
    /// How long a single TCP or UDP probe waits for a reply.
    pub probe_timeout: Duration,
    /// How long the echo probe waits for a reply.
    pub ping_timeout: Duration,
    /// Skips the echo probe. Liveness is then reported as not checked.
    pub skip_ping: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_banner: false,
            quiet: 0,
            disable_input: false,
            concurrency: DEFAULT_CONCURRENCY,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            skip_ping: false,
        }
    }
}

impl Config {
    /// Worker count actually used by the pool.
    pub fn workers(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
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
