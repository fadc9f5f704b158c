//! # Sweepr Common
//!
//! Shared vocabulary of the scanner: the validated [`network::target::Target`],
//! the resolved [`ports::PortSpec`], the per-probe [`scan::ProbeResult`] and the
//! final [`scan::ScanReport`], plus the [`config::Config`] and error types every
//! other crate builds on.

pub mod config;
pub mod error;
pub mod network;
pub mod ports;
pub mod scan;

pub use error::ScanError;

#[doc(hidden)]
pub use tracing;

/// Logs a successful milestone. Rendered with the `[+]` symbol by the CLI formatter.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(target: "sweepr::success", $($arg)+)
    };
}
