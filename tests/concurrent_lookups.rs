//! Independent invocations running at the same time.

#![cfg(feature = "tiers")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use sawtooth::tiers::MemoryTier;
use sawtooth::{pipeline, Getter, Pipeline, Setter, Step};

use common::{Origin, Profile, Trace};

/// Memory tier that records every call into a shared trace.
struct Traced {
    name: &'static str,
    inner: MemoryTier<String, Profile>,
    trace: Trace,
}

impl Traced {
    fn new(name: &'static str, trace: &Trace) -> Arc<Self> {
        Arc::new(Self {
            name,
            inner: MemoryTier::new(),
            trace: trace.clone(),
        })
    }
}

#[async_trait]
impl Getter<String, Profile> for Traced {
    async fn get(&self, key: &String) -> Result<Option<Profile>> {
        self.trace.record(key, format!("{}.get", self.name));
        tokio::task::yield_now().await;
        self.inner.get(key).await
    }
}

#[async_trait]
impl Setter<String, Profile> for Traced {
    async fn set(&self, key: &String, value: &Profile) -> Result<()> {
        self.trace.record(key, format!("{}.set", self.name));
        tokio::task::yield_now().await;
        self.inner.set(key, value).await
    }
}

struct TracedOrigin {
    origin: Arc<Origin>,
    trace: Trace,
}

#[async_trait]
impl Getter<String, Profile> for TracedOrigin {
    async fn get(&self, key: &String) -> Result<Option<Profile>> {
        self.trace.record(key, "origin.get".to_string());
        self.origin.get(key).await
    }
}

fn traced_pipeline(
    ids: &[&str],
    latency: Duration,
    trace: &Trace,
) -> (Pipeline<String, Profile>, Arc<Origin>) {
    let origin = Origin::with_latency(ids, latency);
    let lookup = pipeline(vec![
        Step::tier(Traced::new("l1", trace)),
        Step::tier(Traced::new("l2", trace)),
        Step::terminal(TracedOrigin {
            origin: origin.clone(),
            trace: trace.clone(),
        }),
    ]);
    (lookup, origin)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_invocation_keeps_its_own_order() {
    let ids: Vec<String> = (0..16).map(|i| format!("user-{}", i)).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let trace = Trace::default();
    let (lookup, origin) = traced_pipeline(&id_refs, Duration::from_millis(5), &trace);

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let lookup = lookup.clone();
            tokio::spawn(async move { lookup.run(id).await })
        })
        .collect();

    for (id, handle) in ids.iter().zip(handles) {
        let profile = handle.await.unwrap().unwrap();
        assert_eq!(&profile.id, id);
    }

    assert_eq!(origin.calls(), ids.len());
    for id in &ids {
        assert_eq!(
            trace.for_key(id),
            vec!["l1.get", "l2.get", "origin.get", "l2.set", "l2.get", "l1.set", "l1.get"],
            "trace for {}",
            id
        );
    }
}

#[tokio::test]
async fn test_same_key_is_not_coalesced() {
    let trace = Trace::default();
    let (lookup, origin) = traced_pipeline(&["u1"], Duration::from_millis(20), &trace);

    let (first, second) =
        futures::future::join(lookup.run("u1".to_string()), lookup.run("u1".to_string())).await;

    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(origin.calls(), 2);
}

#[tokio::test]
async fn test_failure_in_one_invocation_does_not_affect_another() {
    let trace = Trace::default();
    let (lookup, _origin) = traced_pipeline(&["known"], Duration::ZERO, &trace);

    let (missing, found) = futures::future::join(
        lookup.run("unknown".to_string()),
        lookup.run("known".to_string()),
    )
    .await;

    assert!(missing.is_err());
    assert_eq!(found.unwrap().id, "known");
}
