//! In-memory tier.
//!
//! Usually the first step of a pipeline: cheap to probe, filled in by unwind
//! whenever a slower tier answers.
//!
//! # Example
//!
//! ```ignore
//! use sawtooth_tiers::MemoryTier;
//!
//! let memory = Arc::new(MemoryTier::<String, Profile>::new());
//! let lookup = pipeline(vec![Step::tier(memory.clone()), Step::terminal(remote)]);
//! ```

use std::collections::HashMap;
use std::hash::Hash;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use sawtooth_core::{Getter, Setter};

use crate::metrics::TierMetrics;

/// In-memory tier keyed by `K`.
///
/// Thread-safe via internal RwLock.
#[derive(Debug)]
pub struct MemoryTier<K, V> {
    entries: RwLock<HashMap<K, V>>,
    metrics: Option<TierMetrics>,
}

impl<K, V> Default for MemoryTier<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoryTier<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            metrics: None,
        }
    }

    /// Record reads and writes into `metrics`.
    pub fn with_metrics(mut self, metrics: TierMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&TierMetrics> {
        self.metrics.as_ref()
    }

    /// Seed a value without going through a pipeline.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.entries.write().insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<K, V> MemoryTier<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Non-async read, bypassing metrics.
    pub fn peek(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }
}

#[async_trait]
impl<K, V> Getter<K, V> for MemoryTier<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Result<Option<V>> {
        let found = self.entries.read().get(key).cloned();
        if let Some(metrics) = &self.metrics {
            metrics.record_read(found.is_some());
        }
        Ok(found)
    }
}

#[async_trait]
impl<K, V> Setter<K, V> for MemoryTier<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn set(&self, key: &K, value: &V) -> Result<()> {
        self.entries.write().insert(key.clone(), value.clone());
        if let Some(metrics) = &self.metrics {
            metrics.record_write();
        }
        Ok(())
    }
}
