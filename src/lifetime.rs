//! Instance lifetime definitions.

/// Lifetime policy of a binding, controlling instance sharing.
///
/// | lifetime | identity key | sharing scope |
/// |---|---|---|
/// | `Transient` | none | never shared |
/// | `Cached` | the provider (one expanded binding entry) | all resolutions of that provider |
/// | `Singleton` | (concrete type, qualifier) | every provider mapping to that pair |
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Clock;
///
/// let mut builder = ContainerBuilder::new();
/// builder.concrete::<Clock, _>(|_| Ok(Clock));
/// builder.register(BindingEntry::bind::<Clock>().lifetime(Lifetime::Singleton));
///
/// let container = builder.build();
/// let a = container.get::<Clock>().unwrap();
/// let b = container.get::<Clock>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifetime {
    /// New instance per resolution, never cached
    #[default]
    Transient,
    /// One instance per provider
    ///
    /// Two different bindings never share a cached instance, even when they
    /// produce the same concrete type. One binding that serves several
    /// contracts hands the same instance to all of them.
    Cached,
    /// One instance per (concrete type, qualifier)
    ///
    /// Shared by every binding that resolves to the same concrete type with
    /// the same qualifier, whatever contract it was requested through.
    Singleton,
}

impl Lifetime {
    /// Whether instances of this lifetime live in the instance cache.
    pub fn is_cached(self) -> bool {
        !matches!(self, Lifetime::Transient)
    }
}
