//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use sawtooth::Getter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub source: String,
}

/// Stand-in for a slow network origin. Answers from a fixed table, counts
/// every call, and can be told to fail.
pub struct Origin {
    records: HashMap<String, Profile>,
    calls: AtomicUsize,
    failing: Mutex<Option<String>>,
    latency: Duration,
}

impl Origin {
    pub fn with_users(ids: &[&str]) -> Arc<Self> {
        Self::with_latency(ids, Duration::ZERO)
    }

    pub fn with_latency(ids: &[&str], latency: Duration) -> Arc<Self> {
        let records = ids
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    Profile {
                        id: id.to_string(),
                        name: format!("name-of-{}", id),
                        source: "origin".to_string(),
                    },
                )
            })
            .collect();
        Arc::new(Self {
            records,
            calls: AtomicUsize::new(0),
            failing: Mutex::new(None),
            latency,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, message: &str) {
        *self.failing.lock() = Some(message.to_string());
    }
}

#[async_trait]
impl Getter<String, Profile> for Origin {
    async fn get(&self, key: &String) -> Result<Option<Profile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(message) = self.failing.lock().clone() {
            return Err(anyhow!(message));
        }
        Ok(self.records.get(key).cloned())
    }
}

/// Per-key call traces, shared by all tiers of a test pipeline.
#[derive(Clone, Default)]
pub struct Trace {
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl Trace {
    pub fn record(&self, key: &str, call: String) {
        self.calls.lock().push((key.to_string(), call));
    }

    /// Calls made on behalf of `key`, in order.
    pub fn for_key(&self, key: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, call)| call.clone())
            .collect()
    }
}
