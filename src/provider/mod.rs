//! The built container and its resolution engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::cache::{Identity, InstanceCache};
use crate::catalog::TypeCatalog;
use crate::config::ContainerSettings;
use crate::descriptors::BindingDescriptor;
use crate::error::{DiError, DiResult};
use crate::instance::Instance;
use crate::internal::ResolutionPath;
use crate::key::{ContractId, TypeToken};
use crate::lifetime::Lifetime;
use crate::observer::Observers;
use crate::registration::{Provider, Registry};
use crate::traits::ResolverCore;

mod context;
pub use context::ResolverContext;

/// Immutable binding set plus the instance cache, ready to resolve.
///
/// A container is produced by [`ContainerBuilder::build`](crate::ContainerBuilder::build)
/// and never changes its bindings afterwards. It is cheap to clone (clones
/// share one cache) and safe to use from many threads at once.
///
/// # Lifetimes
///
/// | lifetime | shared by |
/// |---|---|
/// | `Transient` | nobody, every request builds |
/// | `Cached` | every resolution of the same provider |
/// | `Singleton` | every provider mapping to the same concrete type and qualifier |
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, ContractId, DiError};
/// use std::sync::Arc;
///
/// trait Handler: Send + Sync {}
/// struct Ping;
/// struct Pong;
/// impl Handler for Ping {}
/// impl Handler for Pong {}
///
/// let mut builder = ContainerBuilder::new();
/// builder.concrete::<Ping, _>(|_| Ok(Ping)).implements::<dyn Handler>(|p| p as Arc<dyn Handler>);
/// builder.concrete::<Pong, _>(|_| Ok(Pong)).implements::<dyn Handler>(|p| p as Arc<dyn Handler>);
/// builder.register(BindingEntry::bind::<dyn Handler>().to::<Ping>().as_single());
/// builder.register(BindingEntry::bind::<dyn Handler>().to::<Pong>().as_single());
///
/// let container = builder.build();
/// let handler = ContractId::of::<dyn Handler>();
///
/// let all = container.resolve_all(&handler).unwrap();
/// assert!(all[0].is::<Ping>());
/// assert!(all[1].is::<Pong>());
///
/// assert!(matches!(
///     container.resolve_one(&handler),
///     Err(DiError::AmbiguousBinding { count: 2, .. })
/// ));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    pub(crate) registry: Registry,
    pub(crate) catalog: TypeCatalog,
    pub(crate) cache: InstanceCache,
    pub(crate) observers: Observers,
    pub(crate) settings: ContainerSettings,
    pub(crate) validated: AtomicBool,
}

impl Container {
    pub(crate) fn new(
        registry: Registry,
        catalog: TypeCatalog,
        observers: Observers,
        mut settings: ContainerSettings,
    ) -> Self {
        settings.max_depth = settings.max_depth.max(1);
        debug!(
            entries = registry.entry_count(),
            providers = registry.providers().len(),
            types = catalog.len(),
            observers = observers.len(),
            "container built"
        );
        Self {
            inner: Arc::new(ContainerInner {
                registry,
                catalog,
                cache: InstanceCache::new(),
                observers,
                settings,
                validated: AtomicBool::new(false),
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ContainerInner {
        &self.inner
    }

    /// Resolves exactly one instance for `contract`.
    ///
    /// Fails with [`DiError::NoBindingFound`] when no provider serves the
    /// contract and with [`DiError::AmbiguousBinding`] when several do, even
    /// if all of them would construct successfully.
    pub fn resolve_one(&self, contract: &ContractId) -> DiResult<Instance> {
        self.inner.observe(contract, || self.inner.resolve_one_at(contract, None))
    }

    /// Resolves one instance per provider of `contract`, in declaration order.
    ///
    /// An unbound contract yields an empty vector. The first construction
    /// error aborts the whole call.
    pub fn resolve_all(&self, contract: &ContractId) -> DiResult<Vec<Instance>> {
        self.inner.observe(contract, || self.inner.resolve_all_at(contract, None))
    }

    /// Like [`resolve_one`](Self::resolve_one), but an unbound contract is
    /// `Ok(None)`. Several providers are still an error.
    pub fn try_resolve(&self, contract: &ContractId) -> DiResult<Option<Instance>> {
        self.inner.observe(contract, || self.inner.try_resolve_at(contract, None))
    }

    pub fn has_binding(&self, contract: &ContractId) -> bool {
        self.inner.registry.contains(contract)
    }

    /// Builds a fresh instance of a catalog type that need not be bound.
    ///
    /// The instance is never cached; its dependencies resolve through the
    /// bindings as usual.
    pub fn instantiate(&self, concrete: TypeToken) -> DiResult<Instance> {
        self.inner.build(concrete, None)
    }

    /// Whether a validation pass has completed without failures.
    pub fn is_validated(&self) -> bool {
        self.inner.validated.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.inner.settings
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.inner.catalog
    }

    /// Every provider in declaration order.
    pub fn descriptors(&self) -> Vec<BindingDescriptor> {
        self.inner
            .registry
            .providers()
            .iter()
            .map(BindingDescriptor::from_provider)
            .collect()
    }

    /// Number of cached and singleton instances built so far.
    pub fn cached_instance_count(&self) -> usize {
        self.inner.cache.len()
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Container Debug ===\n");
        s.push_str("Providers:\n");
        for descriptor in self.descriptors() {
            s.push_str(&format!("  {}\n", descriptor.summary()));
        }
        s.push_str("Contracts:\n");
        let mut contracts: Vec<_> = self.inner.registry.contracts().collect();
        contracts.sort_by_key(|(contract, _)| contract.to_string());
        for (contract, count) in contracts {
            s.push_str(&format!("  {}: {} provider(s)\n", contract, count));
        }
        s.push_str(&format!("Cached instances: {}\n", self.cached_instance_count()));
        s
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("providers", &self.inner.registry.providers().len())
            .field("cached", &self.inner.cache.len())
            .field("validated", &self.is_validated())
            .finish()
    }
}

impl ResolverCore for Container {
    fn resolve_one(&self, contract: &ContractId) -> DiResult<Instance> {
        Container::resolve_one(self, contract)
    }

    fn resolve_all(&self, contract: &ContractId) -> DiResult<Vec<Instance>> {
        Container::resolve_all(self, contract)
    }

    fn try_resolve(&self, contract: &ContractId) -> DiResult<Option<Instance>> {
        Container::try_resolve(self, contract)
    }

    fn instantiate(&self, concrete: TypeToken) -> DiResult<Instance> {
        Container::instantiate(self, concrete)
    }

    fn has_binding(&self, contract: &ContractId) -> bool {
        Container::has_binding(self, contract)
    }
}

impl ContainerInner {
    /// Wraps a top-level request with observer callbacks.
    #[inline]
    fn observe<T>(&self, contract: &ContractId, resolve: impl FnOnce() -> DiResult<T>) -> DiResult<T> {
        if !self.observers.has_observers() {
            return resolve();
        }

        let start = Instant::now();
        self.observers.resolving(contract);
        let result = resolve();
        match &result {
            Ok(_) => self.observers.resolved(contract, start.elapsed()),
            Err(err) => self.observers.failed(contract, err),
        }
        result
    }

    pub(crate) fn resolve_one_at(
        &self,
        contract: &ContractId,
        parent: Option<&ResolutionPath<'_>>,
    ) -> DiResult<Instance> {
        match self.try_resolve_at(contract, parent)? {
            Some(instance) => Ok(instance),
            None => Err(DiError::NoBindingFound(contract.clone())),
        }
    }

    pub(crate) fn try_resolve_at(
        &self,
        contract: &ContractId,
        parent: Option<&ResolutionPath<'_>>,
    ) -> DiResult<Option<Instance>> {
        let mut providers = self.registry.lookup(contract);
        match (providers.next(), providers.len()) {
            (None, _) => Ok(None),
            (Some(provider), 0) => self.construct(provider, parent).map(Some),
            (Some(_), rest) => Err(DiError::AmbiguousBinding {
                contract: contract.clone(),
                count: rest + 1,
            }),
        }
    }

    pub(crate) fn resolve_all_at(
        &self,
        contract: &ContractId,
        parent: Option<&ResolutionPath<'_>>,
    ) -> DiResult<Vec<Instance>> {
        self.registry
            .lookup(contract)
            .map(|provider| self.construct(provider, parent))
            .collect()
    }

    /// Produces the instance for one provider according to its lifetime.
    ///
    /// The in-progress path is checked before the cache slot is touched, so a
    /// cycle through a cached identity fails instead of blocking on its own
    /// construction. Cycles split across threads are caught by the cache.
    pub(crate) fn construct(
        &self,
        provider: &Provider,
        parent: Option<&ResolutionPath<'_>>,
    ) -> DiResult<Instance> {
        let identity = match provider.lifetime {
            Lifetime::Transient => return self.build(provider.concrete, parent),
            Lifetime::Cached => Identity::Cached(provider.id),
            Lifetime::Singleton => Identity::Singleton(provider.concrete, provider.qualifier.clone()),
        };

        if let Some(instance) = self.cache.get(&identity) {
            trace!(?identity, "instance cache hit");
            return Ok(instance);
        }

        let frame = ResolutionPath::enter(parent, provider.concrete, self.settings.max_depth)?;
        self.cache.get_or_create(&identity, provider.concrete, || {
            let instance = self.build_in(&frame)?;
            debug!(concrete = %provider.concrete, ?identity, depth = frame.depth(), "constructed instance");
            if self.observers.has_observers() {
                self.observers.constructed(provider.concrete, &identity);
            }
            Ok(instance)
        })
    }

    /// Builds a fresh, uncached instance of `concrete`.
    pub(crate) fn build(&self, concrete: TypeToken, parent: Option<&ResolutionPath<'_>>) -> DiResult<Instance> {
        let frame = ResolutionPath::enter(parent, concrete, self.settings.max_depth)?;
        self.build_in(&frame)
    }

    fn build_in(&self, frame: &ResolutionPath<'_>) -> DiResult<Instance> {
        let concrete = frame.concrete();
        let entry = self
            .catalog
            .get(concrete)
            .ok_or(DiError::NotInstantiable(concrete))?;
        let factory = entry.factory().ok_or(DiError::NotInstantiable(concrete))?;

        let ctx = ResolverContext::new(self, frame);
        let value = factory(&ctx)?;
        Ok(Instance::new(value, entry.clone()))
    }
}
