//! # Sweepr Core
//!
//! The scanning engine: raw transport plumbing in [`network`], and the
//! liveness prober, probe worker pool and result aggregator in [`scanner`].

pub mod network;
pub mod scanner;
