//! Cascading fallback pipelines with backward write-through.
//!
//! A pipeline asks an ordered series of tiers for a key, stops at the first
//! tier that has a value, then writes that value back into every faster tier
//! it passed on the way down. Typical series: memory, then disk, then network.
//!
//! - [`step`]: the tier model ([`Step`], [`Getter`], [`Setter`], [`Transform`])
//! - [`pipeline`]: the executor ([`Pipeline::run`]) and its event handle
//! - [`unwind`]: the backward propagation phase, usable on its own
//! - [`events`]: the `log` diagnostic channel
//!
//! # Example
//!
//! ```ignore
//! use sawtooth_core::{getter_fn, pipeline, Step, LOG_EVENT};
//!
//! let lookup = pipeline(vec![
//!     Step::tier(memory.clone()).with_label("memory"),
//!     Step::tier(disk.clone()).with_label("disk"),
//!     Step::terminal(getter_fn(|key: String| async move { remote(&key).await }))
//!         .with_label("remote"),
//! ]);
//! lookup.on(LOG_EVENT, |event| println!("{} {} {}", event.level, event.step, event.message));
//!
//! let value = lookup.run("user:42".to_string()).await?;
//! ```

pub mod error;
pub mod events;
pub mod pipeline;
pub mod step;
pub mod unwind;

pub use error::PipelineError;
pub use events::{EventEmitter, Listener, ListenerId, LogEvent, LogLevel, LOG_EVENT};
pub use pipeline::{pipeline, Pipeline};
pub use step::{
    getter_fn, setter_fn, transform_fn, FnGetter, FnSetter, FnTransform, Getter, Setter, Step,
    StepRef, Tier, Transform,
};
pub use unwind::unwind;
