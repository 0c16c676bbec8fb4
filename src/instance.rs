//! Resolved values.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::catalog::{AnyArc, ConcreteType};
use crate::error::{DiError, DiResult};
use crate::key::TypeToken;

/// A resolved value: a shared, type-erased instance plus its concrete type.
///
/// Cloning an `Instance` clones the handle, never the value. Cached and
/// singleton instances are owned by the container's instance cache; callers
/// only ever hold shared handles.
#[derive(Clone)]
pub struct Instance {
    value: AnyArc,
    concrete: Arc<ConcreteType>,
}

impl Instance {
    pub(crate) fn new(value: AnyArc, concrete: Arc<ConcreteType>) -> Self {
        Self { value, concrete }
    }

    /// The concrete type that was constructed.
    pub fn concrete(&self) -> TypeToken {
        self.concrete.token()
    }

    /// Whether the concrete type is `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.concrete.token() == TypeToken::of::<T>()
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        std::ptr::eq(self.data_ptr(), other.data_ptr())
    }

    fn data_ptr(&self) -> *const () {
        Arc::as_ptr(&self.value) as *const ()
    }

    /// Views the instance as `Arc<I>`, if its concrete type registered that
    /// view (every concrete type is viewable as itself).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bindweave::{BindingEntry, ContainerBuilder, ContractId};
    /// use std::sync::Arc;
    ///
    /// trait Named: Send + Sync {
    ///     fn name(&self) -> &str;
    /// }
    ///
    /// struct Widget;
    /// impl Named for Widget {
    ///     fn name(&self) -> &str { "widget" }
    /// }
    ///
    /// let mut builder = ContainerBuilder::new();
    /// builder
    ///     .concrete::<Widget, _>(|_| Ok(Widget))
    ///     .implements::<dyn Named>(|w| w as Arc<dyn Named>);
    /// builder.register(BindingEntry::bind::<dyn Named>().to::<Widget>().as_single());
    ///
    /// let container = builder.build();
    /// let instance = container.resolve_one(&ContractId::of::<dyn Named>()).unwrap();
    ///
    /// assert!(instance.is::<Widget>());
    /// let named = instance.cast::<dyn Named>().unwrap();
    /// let widget = instance.cast::<Widget>().unwrap();
    /// assert_eq!(named.name(), "widget");
    /// assert_eq!(Arc::as_ptr(&named) as *const (), Arc::as_ptr(&widget) as *const ());
    /// ```
    pub fn cast<I: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<I>> {
        let boxed = self.concrete.view(&self.value, TypeId::of::<I>())?;
        boxed.downcast::<Arc<I>>().ok().map(|arc| *arc)
    }

    /// Like [`cast`](Self::cast), failing with [`DiError::TypeMismatch`].
    pub fn view<I: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<I>> {
        self.cast::<I>().ok_or_else(|| DiError::TypeMismatch {
            concrete: self.concrete.token().name(),
            requested: std::any::type_name::<I>(),
        })
    }

    /// The raw type-erased value.
    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("concrete", &self.concrete.token())
            .field("ptr", &self.data_ptr())
            .finish()
    }
}
