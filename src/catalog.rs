//! Concrete type catalog.
//!
//! The catalog replaces runtime reflection: every type the engine may build
//! is described up front with its constructor recipe and the contract views
//! an instance of it can be handed out as. Types declared with
//! [`TypeCatalog::abstract_type`], and types never declared at all, are not
//! instantiable.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use ahash::RandomState;

use crate::error::DiResult;
use crate::key::TypeToken;
use crate::provider::ResolverContext;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Type-erased constructor recipe.
pub(crate) type FactoryFn =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// Turns the stored `Arc<Concrete>` into a boxed `Arc<View>`.
type ViewFn = Arc<dyn Fn(AnyArc) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;

/// Catalog entry for one concrete type.
#[derive(Clone)]
pub struct ConcreteType {
    token: TypeToken,
    factory: Option<FactoryFn>,
    views: HashMap<TypeId, ViewFn, RandomState>,
}

impl ConcreteType {
    pub fn token(&self) -> TypeToken {
        self.token
    }

    /// Whether the type carries a constructor recipe.
    pub fn is_instantiable(&self) -> bool {
        self.factory.is_some()
    }

    /// Whether instances can be viewed as `I`.
    pub fn has_view<I: ?Sized + 'static>(&self) -> bool {
        self.views.contains_key(&TypeId::of::<I>())
    }

    pub(crate) fn factory(&self) -> Option<&FactoryFn> {
        self.factory.as_ref()
    }

    pub(crate) fn view(&self, value: &AnyArc, view: TypeId) -> Option<Box<dyn Any + Send + Sync>> {
        let cast = self.views.get(&view)?;
        cast(value.clone())
    }
}

impl fmt::Debug for ConcreteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcreteType")
            .field("token", &self.token)
            .field("instantiable", &self.is_instantiable())
            .field("views", &self.views.len())
            .finish()
    }
}

/// Registry of concrete types known to a container.
#[derive(Default, Clone)]
pub struct TypeCatalog {
    types: HashMap<TypeToken, Arc<ConcreteType>, RandomState>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an instantiable concrete type with its constructor recipe.
    ///
    /// The factory receives a [`ResolverContext`] through which it resolves
    /// its own dependencies. The type is automatically viewable as itself;
    /// further contract views are added on the returned handle. Declaring a
    /// type twice replaces the earlier recipe and views.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindweave::{TypeCatalog, TypeToken};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync {
    ///     fn greet(&self) -> String;
    /// }
    ///
    /// struct English;
    /// impl Greeter for English {
    ///     fn greet(&self) -> String { "hello".into() }
    /// }
    ///
    /// let mut catalog = TypeCatalog::new();
    /// catalog
    ///     .concrete::<English, _>(|_| Ok(English))
    ///     .implements::<dyn Greeter>(|e| e as Arc<dyn Greeter>);
    ///
    /// let english = catalog.get(TypeToken::of::<English>()).unwrap();
    /// assert!(english.is_instantiable());
    /// assert!(english.has_view::<dyn Greeter>());
    /// assert!(english.has_view::<English>());
    /// ```
    pub fn concrete<T, F>(&mut self, factory: F) -> ConcreteRegistration<'_, T>
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolverContext<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        let token = TypeToken::of::<T>();
        let ctor: FactoryFn = Arc::new(move |ctx: &ResolverContext<'_>| -> DiResult<AnyArc> {
            factory(ctx).map(|value| Arc::new(value) as AnyArc)
        });

        let self_view: ViewFn = Arc::new(|any: AnyArc| {
            any.downcast::<T>()
                .ok()
                .map(|arc| Box::new(arc) as Box<dyn Any + Send + Sync>)
        });
        let mut views: HashMap<TypeId, ViewFn, RandomState> = HashMap::default();
        views.insert(TypeId::of::<T>(), self_view);

        let entry = Arc::new(ConcreteType { token, factory: Some(ctor), views });
        let slot = match self.types.entry(token) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(entry),
        };

        ConcreteRegistration { slot, _marker: PhantomData }
    }

    /// Declares a non-instantiable type (an interface or abstract contract).
    ///
    /// Binding such a type to itself is legal; asking for an instance fails
    /// with [`DiError::NotInstantiable`](crate::DiError::NotInstantiable).
    pub fn abstract_type<I: ?Sized + 'static>(&mut self) -> &mut Self {
        let token = TypeToken::of::<I>();
        self.types.insert(
            token,
            Arc::new(ConcreteType {
                token,
                factory: None,
                views: HashMap::default(),
            }),
        );
        self
    }

    pub fn get(&self, token: TypeToken) -> Option<&Arc<ConcreteType>> {
        self.types.get(&token)
    }

    pub fn contains(&self, token: TypeToken) -> bool {
        self.types.contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Handle returned by [`TypeCatalog::concrete`] for adding contract views.
pub struct ConcreteRegistration<'c, T> {
    slot: &'c mut Arc<ConcreteType>,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T> ConcreteRegistration<'c, T>
where
    T: Send + Sync + 'static,
{
    /// Lets instances of `T` be handed out as `Arc<I>`.
    ///
    /// The cast keeps the allocation, so every view of one instance shares
    /// its identity.
    pub fn implements<I>(self, cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let view: ViewFn = Arc::new(move |any: AnyArc| {
            let concrete = any.downcast::<T>().ok()?;
            Some(Box::new(cast(concrete)) as Box<dyn Any + Send + Sync>)
        });
        Arc::make_mut(self.slot).views.insert(TypeId::of::<I>(), view);
        self
    }
}
