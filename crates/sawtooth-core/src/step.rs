//! Step model for fallback pipelines.
//!
//! A pipeline is an ordered series of [`Step`]s. Each step is one tier of the
//! fallback chain and is one of three shapes:
//!
//! - [`Step::Store`]: a tier that can be read and written (memory map, disk, ...)
//! - [`Step::Transform`]: a pure mapping applied to the value on its way back up
//! - [`Step::Terminal`]: a read-only tier, typically the final authority
//!
//! Capabilities are expressed as async traits so tiers can do real I/O. For
//! ad-hoc steps the [`getter_fn`], [`setter_fn`] and [`transform_fn`]
//! adapters wrap plain async closures.
//!
//! # Example
//!
//! ```ignore
//! use sawtooth_core::{getter_fn, Step};
//!
//! let memory = Arc::new(MemoryTier::new());
//! let steps = vec![
//!     Step::tier(memory).with_label("memory"),
//!     Step::terminal(getter_fn(|key: String| async move { Ok(Some(fetch(&key).await?)) })),
//! ];
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Read capability of a tier.
///
/// `Ok(None)` means the tier holds no value for the key and the pipeline
/// should fall through to the next step. Every `Some` is a real value,
/// including "empty" ones such as `0`, `false` or `""`.
#[async_trait]
pub trait Getter<K, V>: Send + Sync {
    async fn get(&self, key: &K) -> Result<Option<V>>;
}

/// Write capability of a tier.
#[async_trait]
pub trait Setter<K, V>: Send + Sync {
    async fn set(&self, key: &K, value: &V) -> Result<()>;
}

/// Mapping applied to the running value during unwind.
#[async_trait]
pub trait Transform<K, V>: Send + Sync {
    async fn transform(&self, value: V, key: &K) -> Result<V>;
}

#[async_trait]
impl<K, V, T> Getter<K, V> for Arc<T>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
    T: Getter<K, V> + ?Sized,
{
    async fn get(&self, key: &K) -> Result<Option<V>> {
        (**self).get(key).await
    }
}

#[async_trait]
impl<K, V, T> Setter<K, V> for Arc<T>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
    T: Setter<K, V> + ?Sized,
{
    async fn set(&self, key: &K, value: &V) -> Result<()> {
        (**self).set(key, value).await
    }
}

#[async_trait]
impl<K, V, T> Transform<K, V> for Arc<T>
where
    K: Send + Sync + 'static,
    V: Send + 'static,
    T: Transform<K, V> + ?Sized,
{
    async fn transform(&self, value: V, key: &K) -> Result<V> {
        (**self).transform(value, key).await
    }
}

/// A tier that can be both read and written.
pub trait Tier<K, V>: Getter<K, V> + Setter<K, V> {}

impl<K, V, T> Tier<K, V> for T where T: Getter<K, V> + Setter<K, V> {}

/// Identifies a step in diagnostics: its label if one was set, else its
/// zero-based position in the series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepRef {
    Label(String),
    Index(usize),
}

impl StepRef {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            StepRef::Label(label) => Some(label),
            StepRef::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            StepRef::Label(_) => None,
            StepRef::Index(index) => Some(*index),
        }
    }
}

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepRef::Label(label) => write!(f, "{}", label),
            StepRef::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// One tier of a fallback pipeline.
pub enum Step<K, V> {
    /// Readable and writable tier. Written to and re-read during unwind.
    Store {
        get: Arc<dyn Getter<K, V>>,
        set: Arc<dyn Setter<K, V>>,
        label: Option<String>,
    },
    /// Pure mapping step. Skipped during descent, applied during unwind.
    Transform {
        transform: Arc<dyn Transform<K, V>>,
        label: Option<String>,
    },
    /// Read-only tier. Passes the running value through untouched during unwind.
    Terminal {
        get: Arc<dyn Getter<K, V>>,
        label: Option<String>,
    },
}

impl<K, V> Step<K, V> {
    /// Build a store step from separate read and write capabilities.
    pub fn store<G, S>(get: G, set: S) -> Self
    where
        G: Getter<K, V> + 'static,
        S: Setter<K, V> + 'static,
    {
        Step::Store {
            get: Arc::new(get),
            set: Arc::new(set),
            label: None,
        }
    }

    /// Build a store step from one shared object that can both read and write.
    pub fn tier<T>(tier: Arc<T>) -> Self
    where
        T: Tier<K, V> + 'static,
    {
        let get: Arc<dyn Getter<K, V>> = tier.clone();
        let set: Arc<dyn Setter<K, V>> = tier;
        Step::Store {
            get,
            set,
            label: None,
        }
    }

    /// Build a transform step.
    pub fn transform<T>(transform: T) -> Self
    where
        T: Transform<K, V> + 'static,
    {
        Step::Transform {
            transform: Arc::new(transform),
            label: None,
        }
    }

    /// Build a read-only step.
    pub fn terminal<G>(get: G) -> Self
    where
        G: Getter<K, V> + 'static,
    {
        Step::Terminal {
            get: Arc::new(get),
            label: None,
        }
    }

    /// Attach a diagnostic label.
    pub fn with_label(mut self, new_label: impl Into<String>) -> Self {
        match &mut self {
            Step::Store { label, .. }
            | Step::Transform { label, .. }
            | Step::Terminal { label, .. } => {
                *label = Some(new_label.into());
            }
        }
        self
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Step::Store { label, .. }
            | Step::Transform { label, .. }
            | Step::Terminal { label, .. } => label.as_deref(),
        }
    }

    /// Diagnostic reference for this step when it sits at `index` in its series.
    pub fn step_ref(&self, index: usize) -> StepRef {
        match self.label() {
            Some(label) => StepRef::Label(label.to_string()),
            None => StepRef::Index(index),
        }
    }

    /// The read capability, if this step has one.
    pub fn getter(&self) -> Option<&dyn Getter<K, V>> {
        match self {
            Step::Store { get, .. } | Step::Terminal { get, .. } => Some(get.as_ref()),
            Step::Transform { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Step::Store { .. } => "store",
            Step::Transform { .. } => "transform",
            Step::Terminal { .. } => "terminal",
        }
    }
}

impl<K, V> Clone for Step<K, V> {
    fn clone(&self) -> Self {
        match self {
            Step::Store { get, set, label } => Step::Store {
                get: get.clone(),
                set: set.clone(),
                label: label.clone(),
            },
            Step::Transform { transform, label } => Step::Transform {
                transform: transform.clone(),
                label: label.clone(),
            },
            Step::Terminal { get, label } => Step::Terminal {
                get: get.clone(),
                label: label.clone(),
            },
        }
    }
}

impl<K, V> fmt::Debug for Step<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("kind", &self.kind())
            .field("label", &self.label())
            .finish()
    }
}

// ==================== Closure adapters ====================

/// Getter backed by an async closure. See [`getter_fn`].
pub struct FnGetter<F>(F);

/// Setter backed by an async closure. See [`setter_fn`].
pub struct FnSetter<F>(F);

/// Transform backed by an async closure. See [`transform_fn`].
pub struct FnTransform<F>(F);

/// Wrap `async fn(key) -> Result<Option<V>>` as a [`Getter`].
pub fn getter_fn<K, V, F, Fut>(f: F) -> FnGetter<F>
where
    F: Fn(K) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<V>>> + Send,
{
    FnGetter(f)
}

/// Wrap `async fn(key, value) -> Result<()>` as a [`Setter`].
pub fn setter_fn<K, V, F, Fut>(f: F) -> FnSetter<F>
where
    F: Fn(K, V) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send,
{
    FnSetter(f)
}

/// Wrap `async fn(value, key) -> Result<V>` as a [`Transform`].
pub fn transform_fn<K, V, F, Fut>(f: F) -> FnTransform<F>
where
    F: Fn(V, K) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V>> + Send,
{
    FnTransform(f)
}

#[async_trait]
impl<K, V, F, Fut> Getter<K, V> for FnGetter<F>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<V>>> + Send + 'static,
{
    async fn get(&self, key: &K) -> Result<Option<V>> {
        (self.0)(key.clone()).await
    }
}

#[async_trait]
impl<K, V, F, Fut> Setter<K, V> for FnSetter<F>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    F: Fn(K, V) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn set(&self, key: &K, value: &V) -> Result<()> {
        (self.0)(key.clone(), value.clone()).await
    }
}

#[async_trait]
impl<K, V, F, Fut> Transform<K, V> for FnTransform<F>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    F: Fn(V, K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V>> + Send + 'static,
{
    async fn transform(&self, value: V, key: &K) -> Result<V> {
        (self.0)(value, key.clone()).await
    }
}
