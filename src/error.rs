//! Error types for the binding engine.

use thiserror::Error;

use crate::key::{ContractId, TypeToken};

/// Binding and resolution errors
///
/// # Examples
///
/// ```rust
/// use bindweave::{ContainerBuilder, ContractId, DiError};
///
/// struct Missing;
///
/// let container = ContainerBuilder::new().build();
/// match container.resolve_one(&ContractId::of::<Missing>()) {
///     Err(DiError::NoBindingFound(contract)) => {
///         assert!(contract.to_string().contains("Missing"));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No binding entry satisfies the contract
    #[error("No binding found for {0}")]
    NoBindingFound(ContractId),
    /// More than one binding satisfies a contract asked for exactly one value
    #[error("Ambiguous binding for {contract}: {count} providers match")]
    AmbiguousBinding { contract: ContractId, count: usize },
    /// The concrete type is abstract or has no constructor recipe
    #[error("Type is not instantiable: {0}")]
    NotInstantiable(TypeToken),
    /// Construction revisited a concrete type already in progress
    #[error("Cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<&'static str>),
    /// Instance cannot be viewed as the requested type
    #[error("Type mismatch: {concrete} cannot be viewed as {requested}")]
    TypeMismatch {
        concrete: &'static str,
        requested: &'static str,
    },
    /// Maximum construction depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// A constructor recipe failed on its own terms
    #[error("Factory for {concrete} failed: {message}")]
    Factory {
        concrete: &'static str,
        message: String,
    },
}

impl DiError {
    /// Builds a [`DiError::Factory`] for concrete type `T`.
    ///
    /// ```rust
    /// use bindweave::DiError;
    ///
    /// struct Pool;
    /// let err = DiError::factory::<Pool>("no connections");
    /// assert!(err.to_string().contains("no connections"));
    /// ```
    pub fn factory<T: ?Sized + 'static>(message: impl Into<String>) -> Self {
        DiError::Factory {
            concrete: std::any::type_name::<T>(),
            message: message.into(),
        }
    }
}

/// Result type for binding operations
pub type DiResult<T> = Result<T, DiError>;
