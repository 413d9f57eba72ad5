//! Named-event pub/sub used for pipeline diagnostics.
//!
//! Pipelines publish on [`LOG_EVENT`]. Listeners are invoked synchronously,
//! in registration order, and never influence how an invocation settles.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::step::StepRef;

/// Event name used for resolution and failure diagnostics.
pub const LOG_EVENT: &str = "log";

/// Severity of a [`LogEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic payload delivered to listeners.
///
/// Info events carry the value found at the resolution point. Error events
/// carry the failure and no value (nothing has been resolved yet).
#[derive(Debug)]
pub struct LogEvent<'a, K, V> {
    pub level: LogLevel,
    pub message: String,
    pub step: StepRef,
    pub key: &'a K,
    pub value: Option<&'a V>,
    pub error: Option<&'a anyhow::Error>,
}

/// Handle returned on subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Listener callback.
pub type Listener<K, V> = Arc<dyn for<'a> Fn(&LogEvent<'a, K, V>) + Send + Sync>;

struct Registration<K, V> {
    id: ListenerId,
    once: bool,
    listener: Listener<K, V>,
}

/// Many-listener emitter keyed by event name.
pub struct EventEmitter<K, V> {
    listeners: Mutex<HashMap<String, Vec<Registration<K, V>>>>,
    next_id: AtomicU64,
}

impl<K, V> Default for EventEmitter<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EventEmitter<K, V> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Subscribe `listener` to `event`.
    pub fn on<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: for<'a> Fn(&LogEvent<'a, K, V>) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(listener), false)
    }

    /// Alias of [`EventEmitter::on`].
    pub fn add_listener<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: for<'a> Fn(&LogEvent<'a, K, V>) + Send + Sync + 'static,
    {
        self.on(event, listener)
    }

    /// Subscribe a listener that is dropped after its first invocation.
    pub fn once<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: for<'a> Fn(&LogEvent<'a, K, V>) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(listener), true)
    }

    /// Unsubscribe a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(registered) = listeners.get_mut(event) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|r| r.id != id);
        let removed = registered.len() != before;
        if registered.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    /// Drop every listener for `event`, or for all events when `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut listeners = self.listeners.lock();
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map(Vec::len).unwrap_or(0)
    }

    /// Names of events that currently have listeners.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Fire `event` to every listener. Returns whether any listener ran.
    ///
    /// Listeners are called after the registry lock is released, so they may
    /// subscribe or unsubscribe while handling the event.
    pub fn emit(&self, event: &str, payload: &LogEvent<'_, K, V>) -> bool {
        let snapshot: Vec<Listener<K, V>> = {
            let mut listeners = self.listeners.lock();
            let Some(registered) = listeners.get_mut(event) else {
                return false;
            };
            let snapshot = registered.iter().map(|r| r.listener.clone()).collect();
            registered.retain(|r| !r.once);
            if registered.is_empty() {
                listeners.remove(event);
            }
            snapshot
        };

        for listener in &snapshot {
            listener(payload);
        }
        !snapshot.is_empty()
    }

    fn register(&self, event: &str, listener: Listener<K, V>, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(Registration { id, once, listener });
        id
    }
}

impl<K, V> fmt::Debug for EventEmitter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<String, usize> = self
            .listeners
            .lock()
            .iter()
            .map(|(name, registered)| (name.clone(), registered.len()))
            .collect();
        f.debug_struct("EventEmitter").field("listeners", &counts).finish()
    }
}
