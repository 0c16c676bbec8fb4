//! Resolution observers.
//!
//! Observers receive a callback around every top-level resolution and every
//! constructed cached or singleton instance. With no observers registered
//! the container skips timing entirely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::cache::Identity;
use crate::error::DiError;
use crate::key::{ContractId, TypeToken};

/// Hook for observing resolution events.
///
/// Every method has an empty default so implementors pick only what they
/// need. Callbacks run on the resolving thread and must not resolve from the
/// same container.
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, ContractId, ResolutionObserver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl ResolutionObserver for Counter {
///     fn resolving(&self, _contract: &ContractId) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// struct Clock;
///
/// let counter = Arc::new(Counter::default());
/// let mut builder = ContainerBuilder::new();
/// builder.concrete::<Clock, _>(|_| Ok(Clock));
/// builder.register(BindingEntry::bind::<Clock>());
/// builder.add_observer(counter.clone());
///
/// let container = builder.build();
/// container.resolve_one(&ContractId::of::<Clock>()).unwrap();
/// container.resolve_all(&ContractId::of::<Clock>()).unwrap();
/// assert_eq!(counter.0.load(Ordering::Relaxed), 2);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// A top-level request for `contract` is starting.
    fn resolving(&self, _contract: &ContractId) {}

    /// The request for `contract` succeeded after `duration`.
    fn resolved(&self, _contract: &ContractId, _duration: Duration) {}

    /// The request for `contract` failed.
    fn failed(&self, _contract: &ContractId, _error: &DiError) {}

    /// A cached or singleton instance of `concrete` was built for `identity`.
    fn constructed(&self, _concrete: TypeToken, _identity: &Identity) {}
}

/// Fan-out over every registered observer.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn resolving(&self, contract: &ContractId) {
        for observer in &self.observers {
            observer.resolving(contract);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, contract: &ContractId, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(contract, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, contract: &ContractId, error: &DiError) {
        for observer in &self.observers {
            observer.failed(contract, error);
        }
    }

    #[inline]
    pub(crate) fn constructed(&self, concrete: TypeToken, identity: &Identity) {
        for observer in &self.observers {
            observer.constructed(concrete, identity);
        }
    }
}

/// Observer that forwards every event to `tracing`.
///
/// Requests are logged at `trace`, constructions at `debug` and failures at
/// `warn`, all under the `bindweave::observer` target.
///
/// ```rust
/// use bindweave::{ContainerBuilder, TracingObserver};
/// use std::sync::Arc;
///
/// let mut builder = ContainerBuilder::new();
/// builder.add_observer(Arc::new(TracingObserver::with_label("api")));
/// let container = builder.build();
/// # let _ = container;
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: Arc<str>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::with_label("bindweave")
    }

    /// Tags every event with `label`, for telling containers apart.
    pub fn with_label(label: impl Into<Arc<str>>) -> Self {
        Self { label: label.into() }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for TracingObserver {
    fn resolving(&self, contract: &ContractId) {
        trace!(target: "bindweave::observer", label = %self.label, %contract, "resolving");
    }

    fn resolved(&self, contract: &ContractId, duration: Duration) {
        trace!(target: "bindweave::observer", label = %self.label, %contract, ?duration, "resolved");
    }

    fn failed(&self, contract: &ContractId, error: &DiError) {
        warn!(target: "bindweave::observer", label = %self.label, %contract, %error, "resolution failed");
    }

    fn constructed(&self, concrete: TypeToken, identity: &Identity) {
        debug!(target: "bindweave::observer", label = %self.label, %concrete, ?identity, "constructed");
    }
}

/// Observer keeping lock-free resolution counters.
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, ContractId, MetricsObserver};
/// use std::sync::Arc;
///
/// struct Config;
///
/// let metrics = Arc::new(MetricsObserver::new());
/// let mut builder = ContainerBuilder::new();
/// builder.concrete::<Config, _>(|_| Ok(Config));
/// builder.register(BindingEntry::bind::<Config>().as_single());
/// builder.add_observer(metrics.clone());
///
/// let container = builder.build();
/// for _ in 0..3 {
///     container.resolve_one(&ContractId::of::<Config>()).unwrap();
/// }
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.resolutions, 3);
/// assert_eq!(snapshot.constructions, 1);
/// assert_eq!(snapshot.failures, 0);
/// ```
#[derive(Debug, Default)]
pub struct MetricsObserver {
    resolutions: AtomicU64,
    failures: AtomicU64,
    constructions: AtomicU64,
    total_nanos: AtomicU64,
}

/// Point-in-time copy of [`MetricsObserver`] counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub resolutions: u64,
    pub failures: u64,
    pub constructions: u64,
    pub total_time: Duration,
}

impl MetricsSnapshot {
    /// Mean time of a successful resolution.
    pub fn mean_time(&self) -> Option<Duration> {
        let succeeded = self.resolutions.checked_sub(self.failures)?;
        if succeeded == 0 {
            return None;
        }
        Some(self.total_time / u32::try_from(succeeded).unwrap_or(u32::MAX))
    }
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            resolutions: self.resolutions.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            constructions: self.constructions.load(Ordering::Relaxed),
            total_time: Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed)),
        }
    }

    pub fn reset(&self) {
        self.resolutions.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.constructions.store(0, Ordering::Relaxed);
        self.total_nanos.store(0, Ordering::Relaxed);
    }
}

impl ResolutionObserver for MetricsObserver {
    fn resolving(&self, _contract: &ContractId) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }

    fn resolved(&self, _contract: &ContractId, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn failed(&self, _contract: &ContractId, _error: &DiError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    fn constructed(&self, _concrete: TypeToken, _identity: &Identity) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
    }
}
