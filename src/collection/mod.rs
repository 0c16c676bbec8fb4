//! Container builder.
//!
//! Binding entries and catalog declarations accumulate here, on one thread,
//! until [`ContainerBuilder::build`] moves them into an immutable
//! [`Container`].

use std::sync::Arc;

use crate::binding::BindingEntry;
use crate::catalog::{ConcreteRegistration, TypeCatalog};
use crate::config::ContainerSettings;
use crate::error::DiResult;
use crate::observer::{Observers, ResolutionObserver};
use crate::provider::{Container, ResolverContext};
use crate::registration::Registry;

/// Collects binding entries, catalog types and observers.
///
/// Nothing is checked while registering: duplicate contracts, bindings to
/// undeclared types and dangling dependencies are all accepted and only
/// surface when an instance is requested or [`Container::validate`] runs.
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, Resolver};
/// use std::sync::Arc;
///
/// trait Mailer: Send + Sync {
///     fn send(&self, to: &str) -> String;
/// }
///
/// struct Smtp { host: String }
/// impl Mailer for Smtp {
///     fn send(&self, to: &str) -> String { format!("{} via {}", to, self.host) }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder
///     .concrete::<Smtp, _>(|_| Ok(Smtp { host: "mail.local".into() }))
///     .implements::<dyn Mailer>(|s| s as Arc<dyn Mailer>);
/// builder.register(BindingEntry::bind::<dyn Mailer>().to::<Smtp>().as_single().non_lazy());
///
/// let container = builder.build();
/// container.validate().unwrap();
///
/// let mailer = container.get::<dyn Mailer>().unwrap();
/// assert_eq!(mailer.send("ops"), "ops via mail.local");
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    registry: Registry,
    catalog: TypeCatalog,
    observers: Observers,
    settings: ContainerSettings,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing catalog, typically one shared by several
    /// containers.
    pub fn with_catalog(catalog: TypeCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Adds a binding entry. Entries keep their declaration order.
    pub fn register(&mut self, entry: BindingEntry) -> &mut Self {
        self.registry.register(entry);
        self
    }

    /// Adds several binding entries in order.
    pub fn register_all(&mut self, entries: impl IntoIterator<Item = BindingEntry>) -> &mut Self {
        for entry in entries {
            self.registry.register(entry);
        }
        self
    }

    /// Declares an instantiable concrete type. See [`TypeCatalog::concrete`].
    pub fn concrete<T, F>(&mut self, factory: F) -> ConcreteRegistration<'_, T>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.catalog.concrete::<T, F>(factory)
    }

    /// Declares an abstract, non-instantiable type.
    pub fn abstract_type<I: ?Sized + 'static>(&mut self) -> &mut Self {
        self.catalog.abstract_type::<I>();
        self
    }

    pub fn catalog_mut(&mut self) -> &mut TypeCatalog {
        &mut self.catalog
    }

    pub fn add_observer(&mut self, observer: Arc<dyn ResolutionObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    pub fn with_settings(&mut self, settings: ContainerSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    pub fn settings_mut(&mut self) -> &mut ContainerSettings {
        &mut self.settings
    }

    /// Number of binding entries registered so far.
    pub fn entry_count(&self) -> usize {
        self.registry.entry_count()
    }

    /// Freezes the bindings into a [`Container`].
    pub fn build(self) -> Container {
        Container::new(self.registry, self.catalog, self.observers, self.settings)
    }
}
