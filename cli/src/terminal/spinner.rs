use std::sync::Arc;

use colored::*;
use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

const TIP: &str = "You can press 'q' to finish early";

/// A spinner tied to a tracing span; it disappears when dropped.
pub struct ScanSpinner {
    span: Span,
    total: usize,
}

impl ScanSpinner {
    pub fn start(total: usize, input_enabled: bool) -> Self {
        let span = info_span!("scan", indicatif.pb_show = true);
        span.pb_set_style(&style());
        if input_enabled {
            span.pb_set_message(&format!("{}", TIP.italic().white()));
        }
        span.pb_start();

        Self { span, total }
    }

    /// A `Send + Sync` callback workers can call with the finished port count.
    pub fn progress_reporter(&self) -> Arc<dyn Fn(usize) + Send + Sync> {
        let span = self.span.clone();
        let total = self.total;
        Arc::new(move |done| span.pb_set_message(&progress_message(done, total)))
    }
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

fn progress_message(done: usize, total: usize) -> String {
    format!(
        "{}/{} ports probed",
        done.to_string().green().bold(),
        total
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
