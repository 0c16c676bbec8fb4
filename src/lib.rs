//! # bindweave
//!
//! Typed binding and resolution engine: declare which concrete types satisfy
//! which contracts, under which lifetime, then resolve instances with their
//! dependencies built depth-first.
//!
//! ## Features
//!
//! - **Multi-contract bindings**: one entry can serve several contracts, and
//!   one contract can be served by several entries
//! - **Three lifetimes**: transient, cached per binding, singleton per
//!   concrete type and qualifier
//! - **Explicit catalog**: constructor recipes and contract views are declared
//!   up front instead of discovered by reflection
//! - **Cycle detection**: cyclic graphs fail with the full path
//! - **Eager validation**: `non_lazy` bindings are built and checked in one pass
//! - **Thread-safe**: a built container is `Send + Sync`; concurrent first
//!   access to a shared instance runs its factory once
//!
//! ## Quick Start
//!
//! ```rust
//! use bindweave::{BindingEntry, ContainerBuilder, Resolver};
//! use std::sync::Arc;
//!
//! trait Store: Send + Sync {
//!     fn url(&self) -> &str;
//! }
//!
//! struct Postgres {
//!     url: String,
//! }
//! impl Store for Postgres {
//!     fn url(&self) -> &str { &self.url }
//! }
//!
//! struct UserService {
//!     store: Arc<dyn Store>,
//! }
//!
//! let mut builder = ContainerBuilder::new();
//! builder
//!     .concrete::<Postgres, _>(|_| Ok(Postgres { url: "postgres://localhost".into() }))
//!     .implements::<dyn Store>(|p| p as Arc<dyn Store>);
//! builder.concrete::<UserService, _>(|ctx| {
//!     Ok(UserService { store: ctx.get::<dyn Store>()? })
//! });
//!
//! builder
//!     .register(BindingEntry::bind::<dyn Store>().to::<Postgres>().as_single())
//!     .register(BindingEntry::bind::<UserService>());
//!
//! let container = builder.build();
//! container.validate().unwrap();
//!
//! let users = container.get::<UserService>().unwrap();
//! assert_eq!(users.store.url(), "postgres://localhost");
//! ```
//!
//! ## Lifetimes
//!
//! - **Transient**: built on every resolution
//! - **Cached**: built once per binding; two bindings never share
//! - **Singleton**: built once per (concrete type, qualifier), shared by every
//!   binding that maps to that pair
//!
//! ```rust
//! use bindweave::{BindingEntry, ContainerBuilder, ContractId};
//! use std::sync::Arc;
//!
//! trait Reader: Send + Sync {}
//! trait Writer: Send + Sync {}
//! struct File;
//! impl Reader for File {}
//! impl Writer for File {}
//!
//! let mut builder = ContainerBuilder::new();
//! builder
//!     .concrete::<File, _>(|_| Ok(File))
//!     .implements::<dyn Reader>(|f| f as Arc<dyn Reader>)
//!     .implements::<dyn Writer>(|f| f as Arc<dyn Writer>);
//! builder.register(BindingEntry::bind::<dyn Reader>().to::<File>().as_single());
//! builder.register(BindingEntry::bind::<dyn Writer>().to::<File>().as_single());
//!
//! let container = builder.build();
//! let reader = container.resolve_one(&ContractId::of::<dyn Reader>()).unwrap();
//! let writer = container.resolve_one(&ContractId::of::<dyn Writer>()).unwrap();
//! assert!(reader.ptr_eq(&writer));
//! ```
//!
//! ## Cargo features
//!
//! - `diagnostics`: `Container::to_debug_string`
//! - `config`: serde support for [`ContainerSettings`] and JSON loading

pub mod binding;
pub mod cache;
pub mod catalog;
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod instance;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod provider;
pub mod registration;
pub mod traits;
pub mod validation;

mod internal;

pub use binding::{BindingEntry, Production};
pub use cache::{Identity, InstanceCache};
pub use catalog::{ConcreteRegistration, ConcreteType, TypeCatalog};
pub use collection::ContainerBuilder;
pub use config::{ContainerSettings, DEFAULT_MAX_DEPTH};
pub use descriptors::BindingDescriptor;
pub use error::{DiError, DiResult};
pub use instance::Instance;
pub use key::{ContractId, TypeToken};
pub use lifetime::Lifetime;
pub use observer::{MetricsObserver, MetricsSnapshot, ResolutionObserver, TracingObserver};
pub use provider::{Container, ResolverContext};
pub use registration::ProviderId;
pub use traits::{Resolver, ResolverCore};
pub use validation::{ValidationFailure, ValidationReport, ValidationWarning};
