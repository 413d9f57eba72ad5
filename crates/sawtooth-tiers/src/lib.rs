//! Reference tiers for sawtooth pipelines.
//!
//! This crate provides:
//! - `MemoryTier`: `HashMap` behind a `RwLock`, the usual first step
//! - `FsTier`: sharded JSON files on disk, written atomically
//! - `TierMetrics`: hit/miss/write counters shared between tier and caller
//! - `FsTierConfig`: filesystem tier settings with `SAWTOOTH_*` env overrides

pub mod config;
pub mod fs;
pub mod memory;
pub mod metrics;
pub mod paths;

pub use config::FsTierConfig;
pub use fs::FsTier;
pub use memory::MemoryTier;
pub use metrics::{TierMetrics, TierMetricsSnapshot};
