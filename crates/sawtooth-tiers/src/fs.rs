//! Filesystem-backed tier.
//!
//! Each key is stored as one JSON file under a sharded directory layout (see
//! [`crate::paths`]). A missing file reads as "no value"; an unreadable or
//! corrupt file is an error, so the pipeline stops instead of silently
//! falling through to a slower tier.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sawtooth_core::{Getter, Setter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::FsTierConfig;
use crate::metrics::TierMetrics;
use crate::paths::{atomic_write, value_path};

/// Filesystem tier storing values of type `V` as JSON.
pub struct FsTier<V> {
    dir: Arc<Path>,
    shard_depth: usize,
    metrics: Option<TierMetrics>,
    _value: PhantomData<fn() -> V>,
}

impl<V> FsTier<V> {
    /// Create a tier rooted at `dir` with the default shard depth.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::open(dir.as_ref().to_path_buf(), FsTierConfig::default().shard_depth, None)
    }

    /// Create a tier from a config; the tier lives in `config.dir()`.
    pub fn from_config(config: &FsTierConfig) -> Result<Self> {
        let metrics = config.metrics.then(TierMetrics::new);
        Self::open(config.dir(), config.shard_depth, metrics)
    }

    fn open(dir: PathBuf, shard_depth: usize, metrics: Option<TierMetrics>) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| anyhow!("Failed to create tier directory {}: {}", dir.display(), e))?;
        Ok(Self {
            dir: Arc::from(dir),
            shard_depth,
            metrics,
            _value: PhantomData,
        })
    }

    /// Record reads and writes into `metrics`.
    pub fn with_metrics(mut self, metrics: TierMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&TierMetrics> {
        self.metrics.as_ref()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the value for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        value_path(&self.dir, key, self.shard_depth)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// Delete the value for `key`. Returns whether a value existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(anyhow!("Failed to remove {}: {}", path.display(), e)),
        }
    }
}

impl<V> std::fmt::Debug for FsTier<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsTier")
            .field("dir", &self.dir)
            .field("shard_depth", &self.shard_depth)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

fn read_value<V: DeserializeOwned>(path: &Path) -> Result<Option<V>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(anyhow!("Failed to read {}: {}", path.display(), e)),
    };
    let value = serde_json::from_slice(&bytes)
        .map_err(|e| anyhow!("Failed to parse {}: {}", path.display(), e))?;
    Ok(Some(value))
}

#[async_trait]
impl<K, V> Getter<K, V> for FsTier<V>
where
    K: AsRef<str> + Send + Sync + 'static,
    V: DeserializeOwned + Send + 'static,
{
    async fn get(&self, key: &K) -> Result<Option<V>> {
        let path = self.path_for(key.as_ref());
        let found = tokio::task::spawn_blocking(move || read_value::<V>(&path))
            .await
            .map_err(|e| anyhow!("Filesystem read task failed: {}", e))??;

        debug!(dir = %self.dir.display(), hit = found.is_some(), "fs tier read");
        if let Some(metrics) = &self.metrics {
            metrics.record_read(found.is_some());
        }
        Ok(found)
    }
}

#[async_trait]
impl<K, V> Setter<K, V> for FsTier<V>
where
    K: AsRef<str> + Send + Sync + 'static,
    V: Serialize + Send + Sync + 'static,
{
    async fn set(&self, key: &K, value: &V) -> Result<()> {
        let path = self.path_for(key.as_ref());
        let bytes =
            serde_json::to_vec(value).map_err(|e| anyhow!("Failed to serialize JSON: {}", e))?;
        tokio::task::spawn_blocking(move || atomic_write(&path, &bytes))
            .await
            .map_err(|e| anyhow!("Filesystem write task failed: {}", e))??;

        if let Some(metrics) = &self.metrics {
            metrics.record_write();
        }
        Ok(())
    }
}
