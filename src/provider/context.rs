//! Resolver context handed to constructor recipes.

use crate::error::DiResult;
use crate::instance::Instance;
use crate::internal::ResolutionPath;
use crate::key::{ContractId, TypeToken};
use crate::provider::ContainerInner;
use crate::traits::ResolverCore;

/// Context passed to factory functions for resolving dependencies.
///
/// A context belongs to exactly one in-progress construction. Everything
/// resolved through it is built as a dependency of that construction, so a
/// dependency that leads back to a type still being built fails with
/// [`DiError::CyclicDependency`](crate::DiError::CyclicDependency) instead of
/// recursing.
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut builder = ContainerBuilder::new();
/// builder.concrete::<Database, _>(|_| Ok(Database { url: "postgres://localhost".into() }));
/// builder.concrete::<UserService, _>(|ctx| {
///     // ctx resolves the service's own dependencies
///     Ok(UserService { db: ctx.get::<Database>()? })
/// });
/// builder
///     .register(BindingEntry::bind::<Database>().as_single())
///     .register(BindingEntry::bind::<UserService>());
///
/// let container = builder.build();
/// let service = container.get::<UserService>().unwrap();
/// assert_eq!(service.db.url, "postgres://localhost");
/// ```
pub struct ResolverContext<'a> {
    inner: &'a ContainerInner,
    frame: &'a ResolutionPath<'a>,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(inner: &'a ContainerInner, frame: &'a ResolutionPath<'a>) -> Self {
        Self { inner, frame }
    }

    /// Concrete type whose construction this context serves.
    pub fn building(&self) -> TypeToken {
        self.frame.concrete()
    }

    /// Number of constructions in progress on this path, this one included.
    pub fn depth(&self) -> usize {
        self.frame.depth()
    }
}

impl<'a> ResolverCore for ResolverContext<'a> {
    fn resolve_one(&self, contract: &ContractId) -> DiResult<Instance> {
        self.inner.resolve_one_at(contract, Some(self.frame))
    }

    fn resolve_all(&self, contract: &ContractId) -> DiResult<Vec<Instance>> {
        self.inner.resolve_all_at(contract, Some(self.frame))
    }

    fn try_resolve(&self, contract: &ContractId) -> DiResult<Option<Instance>> {
        self.inner.try_resolve_at(contract, Some(self.frame))
    }

    fn instantiate(&self, concrete: TypeToken) -> DiResult<Instance> {
        self.inner.build(concrete, Some(self.frame))
    }

    fn has_binding(&self, contract: &ContractId) -> bool {
        self.inner.registry.contains(contract)
    }
}
