//! Type identifiers for contracts and concrete types.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Opaque, comparable handle for a contract or concrete type.
///
/// Equality and hashing only look at the `TypeId`; the type name is carried
/// for diagnostics. Trait objects work too: `TypeToken::of::<dyn Logger>()`.
///
/// # Examples
///
/// ```rust
/// use bindweave::TypeToken;
///
/// trait Logger: Send + Sync {}
///
/// let a = TypeToken::of::<String>();
/// let b = TypeToken::of::<String>();
/// assert_eq!(a, b);
/// assert_ne!(a, TypeToken::of::<dyn Logger>());
/// assert!(a.name().contains("String"));
/// ```
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    /// Token for `T`. `T` may be unsized (`dyn Trait`, `str`).
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Diagnostic type name (`std::any::type_name`).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Hot path: TypeId-only comparison, the name is diagnostic
impl PartialEq for TypeToken {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeToken({})", self.name)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A contract identifier: a type token plus an optional qualifier.
///
/// Equality is structural. The same token with different qualifiers, or with
/// a qualifier on one side only, names distinct contracts.
///
/// # Examples
///
/// ```rust
/// use bindweave::ContractId;
///
/// struct Port;
///
/// let plain = ContractId::of::<Port>();
/// let admin = ContractId::with_qualifier::<Port>("admin");
///
/// assert_ne!(plain, admin);
/// assert_eq!(admin, ContractId::of::<Port>().qualified("admin"));
/// assert_eq!(admin.qualifier(), Some("admin"));
/// assert_eq!(plain.qualifier(), None);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContractId {
    token: TypeToken,
    qualifier: Option<Arc<str>>,
}

impl ContractId {
    /// Unqualified contract for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_token(TypeToken::of::<T>())
    }

    /// Qualified contract for `T`.
    pub fn with_qualifier<T: ?Sized + 'static>(qualifier: impl Into<Arc<str>>) -> Self {
        Self::of::<T>().qualified(qualifier)
    }

    /// Unqualified contract for an existing token.
    pub fn from_token(token: TypeToken) -> Self {
        Self { token, qualifier: None }
    }

    /// Replaces the qualifier.
    pub fn qualified(mut self, qualifier: impl Into<Arc<str>>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn token(&self) -> TypeToken {
        self.token
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl From<TypeToken> for ContractId {
    fn from(token: TypeToken) -> Self {
        Self::from_token(token)
    }
}

impl fmt::Debug for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContractId({})", self)
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}#{}", self.token.name, q),
            None => f.write_str(self.token.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    trait Speaker: Send + Sync {}

    #[test]
    fn token_equality_ignores_name() {
        let a = TypeToken::of::<u32>();
        let b = TypeToken { id: TypeId::of::<u32>(), name: "renamed" };
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn unsized_tokens() {
        let t = TypeToken::of::<dyn Speaker>();
        assert!(t.name().contains("Speaker"));
        assert_ne!(t, TypeToken::of::<str>());
    }

    #[test]
    fn contract_display() {
        assert_eq!(ContractId::of::<u8>().to_string(), "u8");
        assert_eq!(ContractId::with_qualifier::<u8>("x").to_string(), "u8#x");
    }
}
