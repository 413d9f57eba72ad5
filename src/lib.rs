//! Sawtooth: cascading fallback pipelines.
//!
//! Probe an ordered series of tiers for a key, stop at the first tier that
//! holds a value, then write it back through every faster tier on the way up:
//!
//! ```text
//!   memory ──miss──▶ disk ──miss──▶ remote ──hit──┐
//!     ▲                ▲                          │
//!     └──set/get───────┴──────────set/get─────────┘
//! ```
//!
//! - Pipeline engine: [`Pipeline`], [`Step`], [`unwind`] (from `sawtooth-core`)
//! - Reference tiers: [`tiers`] (from `sawtooth-tiers`, feature `tiers`)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sawtooth::tiers::{FsTier, MemoryTier};
//! use sawtooth::{getter_fn, pipeline, Step, LOG_EVENT};
//!
//! let memory = Arc::new(MemoryTier::new());
//! let disk = Arc::new(FsTier::new("/var/cache/profiles")?);
//! let profiles = pipeline(vec![
//!     Step::tier(memory).with_label("memory"),
//!     Step::tier(disk).with_label("disk"),
//!     Step::terminal(getter_fn(|id: String| async move { fetch_profile(&id).await }))
//!         .with_label("api"),
//! ]);
//! profiles.on(LOG_EVENT, |event| {
//!     eprintln!("[{}] {} at {}", event.level, event.message, event.step)
//! });
//!
//! let profile = profiles.run("user:42".to_string()).await?;
//! ```

pub use sawtooth_core::*;

#[cfg(feature = "tiers")]
pub use sawtooth_tiers as tiers;
