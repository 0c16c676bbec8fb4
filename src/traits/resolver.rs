//! Resolver traits.

use std::sync::Arc;

use crate::error::DiResult;
use crate::instance::Instance;
use crate::key::{ContractId, TypeToken};

/// Object-safe resolution interface.
///
/// Implemented by [`Container`](crate::Container) for top-level requests and
/// by [`ResolverContext`](crate::ResolverContext) for dependencies requested
/// from inside a constructor recipe. Most callers want the typed helpers of
/// [`Resolver`] instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves exactly one instance for `contract`.
    ///
    /// * `Err(NoBindingFound)` when no provider serves the contract
    /// * `Err(AmbiguousBinding)` when more than one does
    fn resolve_one(&self, contract: &ContractId) -> DiResult<Instance>;

    /// Resolves one instance per provider, in declaration order. Unbound
    /// contracts give an empty vector.
    fn resolve_all(&self, contract: &ContractId) -> DiResult<Vec<Instance>>;

    /// Resolves at most one instance; unbound contracts give `Ok(None)`.
    fn try_resolve(&self, contract: &ContractId) -> DiResult<Option<Instance>>;

    /// Builds an uncached instance of a catalog type.
    fn instantiate(&self, concrete: TypeToken) -> DiResult<Instance>;

    fn has_binding(&self, contract: &ContractId) -> bool;
}

/// Typed resolution helpers on top of [`ResolverCore`].
///
/// Every helper resolves by contract and then views the instance as the
/// requested type through the catalog; a concrete type that never declared
/// that view fails with [`DiError::TypeMismatch`](crate::DiError::TypeMismatch).
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// trait Plugin: Send + Sync {
///     fn name(&self) -> &str;
/// }
///
/// struct Audit;
/// impl Plugin for Audit {
///     fn name(&self) -> &str { "audit" }
/// }
///
/// struct Backup;
/// impl Plugin for Backup {
///     fn name(&self) -> &str { "backup" }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder.concrete::<Audit, _>(|_| Ok(Audit)).implements::<dyn Plugin>(|p| p as Arc<dyn Plugin>);
/// builder.concrete::<Backup, _>(|_| Ok(Backup)).implements::<dyn Plugin>(|p| p as Arc<dyn Plugin>);
/// builder.register(BindingEntry::bind::<dyn Plugin>().to::<Audit>().as_single());
/// builder.register(BindingEntry::bind::<dyn Plugin>().to::<Backup>().as_single().with_id("nightly"));
///
/// let container = builder.build();
///
/// let plugin = container.get::<dyn Plugin>().unwrap();
/// assert_eq!(plugin.name(), "audit");
///
/// let nightly = container.get_with_id::<dyn Plugin>("nightly").unwrap();
/// assert_eq!(nightly.name(), "backup");
///
/// assert!(container.try_get::<Audit>().unwrap().is_none());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves the unqualified contract `I` and views it as `Arc<I>`.
    fn get<I: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<I>> {
        self.resolve_one(&ContractId::of::<I>())?.view::<I>()
    }

    /// Resolves contract `I` qualified with `qualifier`.
    fn get_with_id<I: ?Sized + Send + Sync + 'static>(&self, qualifier: &str) -> DiResult<Arc<I>> {
        self.resolve_one(&ContractId::with_qualifier::<I>(qualifier))?
            .view::<I>()
    }

    /// Resolves every provider of contract `I`, in declaration order.
    fn get_all<I: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<I>>> {
        self.resolve_all(&ContractId::of::<I>())?
            .iter()
            .map(Instance::view::<I>)
            .collect()
    }

    /// Resolves contract `I` if anything serves it.
    fn try_get<I: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<I>>> {
        self.try_resolve(&ContractId::of::<I>())?
            .map(|instance| instance.view::<I>())
            .transpose()
    }

    /// Resolves contract `I`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics with the resolution error if `I` cannot be resolved. Meant for
    /// wiring code that has already passed [`validate`](crate::Container::validate).
    fn get_required<I: ?Sized + Send + Sync + 'static>(&self) -> Arc<I> {
        self.get::<I>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<I>(), e))
    }

    /// Builds a fresh, unbound `T` from the catalog.
    fn create<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.instantiate(TypeToken::of::<T>())?.view::<T>()
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
