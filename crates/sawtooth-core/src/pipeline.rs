//! Pipeline executor: forward descent plus the event-source handle.
//!
//! A [`Pipeline`] is bound to one step series for its whole life. Each call
//! to [`Pipeline::run`] is independent:
//!
//! 1. Steps are probed in order, one getter at a time. Transform steps are
//!    skipped; a getter that returns `None` falls through to the next step.
//! 2. The first getter to return a value is the resolution point. A `log`
//!    info event is emitted and the value is unwound through the steps
//!    visited before it (see [`crate::unwind`]).
//! 3. A failing getter emits a `log` error event and ends the invocation with
//!    that error. A series where every getter misses ends with
//!    [`PipelineError::Exhausted`].
//!
//! Cloning a pipeline is cheap; clones share the step series and listeners.

use std::fmt::{self, Debug};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::events::{EventEmitter, ListenerId, LogEvent, LogLevel, LOG_EVENT};
use crate::step::Step;
use crate::unwind::unwind;

const RESOLVED_MESSAGE: &str = "getting value at step";

struct Inner<K, V> {
    steps: Vec<Step<K, V>>,
    events: EventEmitter<K, V>,
}

/// A callable fallback pipeline over an immutable step series.
pub struct Pipeline<K, V> {
    inner: Arc<Inner<K, V>>,
}

/// Build a pipeline from a step series. Equivalent to [`Pipeline::new`].
pub fn pipeline<K, V>(steps: impl IntoIterator<Item = Step<K, V>>) -> Pipeline<K, V> {
    Pipeline::new(steps)
}

impl<K, V> Pipeline<K, V> {
    /// Build a pipeline. Never fails: an empty series produces a pipeline
    /// whose every invocation fails with [`PipelineError::InvalidSeries`].
    pub fn new(steps: impl IntoIterator<Item = Step<K, V>>) -> Self {
        let steps: Vec<Step<K, V>> = steps.into_iter().collect();
        if steps.is_empty() {
            debug!("pipeline built without steps; invocations will fail");
        }
        Self {
            inner: Arc::new(Inner {
                steps,
                events: EventEmitter::new(),
            }),
        }
    }

    pub fn steps(&self) -> &[Step<K, V>] {
        &self.inner.steps
    }

    pub fn len(&self) -> usize {
        self.inner.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.steps.is_empty()
    }

    /// Whether invocations can ever resolve.
    pub fn is_valid(&self) -> bool {
        !self.is_empty()
    }

    // ==================== Events ====================

    /// Direct access to the diagnostic emitter.
    pub fn events(&self) -> &EventEmitter<K, V> {
        &self.inner.events
    }

    pub fn on<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: for<'a> Fn(&LogEvent<'a, K, V>) + Send + Sync + 'static,
    {
        self.inner.events.on(event, listener)
    }

    pub fn add_listener<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: for<'a> Fn(&LogEvent<'a, K, V>) + Send + Sync + 'static,
    {
        self.inner.events.add_listener(event, listener)
    }

    pub fn once<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: for<'a> Fn(&LogEvent<'a, K, V>) + Send + Sync + 'static,
    {
        self.inner.events.once(event, listener)
    }

    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        self.inner.events.remove_listener(event, id)
    }

    pub fn remove_all_listeners(&self, event: Option<&str>) {
        self.inner.events.remove_all_listeners(event)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner.events.listener_count(event)
    }

    pub fn emit(&self, event: &str, payload: &LogEvent<'_, K, V>) -> bool {
        self.inner.events.emit(event, payload)
    }
}

impl<K, V> Pipeline<K, V>
where
    K: Debug + Send + Sync,
    V: Send + Sync,
{
    /// Resolve `key` through the step series.
    pub async fn run(&self, key: K) -> Result<V> {
        let steps = &self.inner.steps;
        if steps.is_empty() {
            return Err(PipelineError::InvalidSeries.into());
        }

        for (index, step) in steps.iter().enumerate() {
            let Some(get) = step.getter() else {
                debug!(
                    step = %step.step_ref(index),
                    key = ?key,
                    "descent: skipping transform step"
                );
                continue;
            };

            match get.get(&key).await {
                Ok(None) => {
                    debug!(step = %step.step_ref(index), key = ?key, "descent: miss");
                }
                Ok(Some(value)) => {
                    let step_ref = step.step_ref(index);
                    info!(step = %step_ref, key = ?key, "value resolved");
                    self.inner.events.emit(
                        LOG_EVENT,
                        &LogEvent {
                            level: LogLevel::Info,
                            message: RESOLVED_MESSAGE.to_string(),
                            step: step_ref,
                            key: &key,
                            value: Some(&value),
                            error: None,
                        },
                    );
                    return unwind(&steps[..index], &key, value).await;
                }
                Err(err) => {
                    let step_ref = step.step_ref(index);
                    warn!(step = %step_ref, key = ?key, error = %err, "descent: getter failed");
                    self.inner.events.emit(
                        LOG_EVENT,
                        &LogEvent {
                            level: LogLevel::Error,
                            message: err.to_string(),
                            step: step_ref,
                            key: &key,
                            value: None,
                            error: Some(&err),
                        },
                    );
                    return Err(err);
                }
            }
        }

        debug!(key = ?key, steps = steps.len(), "descent: every step missed");
        Err(PipelineError::Exhausted { steps: steps.len() }.into())
    }
}

impl<K, V> Default for Pipeline<K, V> {
    /// A pipeline with no step series; every invocation fails.
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<K, V> Clone for Pipeline<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Pipeline<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.inner.steps)
            .field("events", &self.inner.events)
            .finish()
    }
}
