//! Binding entries: the declarative unit mapping contracts to producers.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::key::{ContractId, TypeToken};
use crate::lifetime::Lifetime;

/// Contract sets are almost always one or two entries long.
pub(crate) type ContractSet = SmallVec<[ContractId; 2]>;

/// How a binding entry produces concrete instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
    /// Each contract is its own concrete type
    ToSelf,
    /// One concrete type serving every contract
    ToConcrete(TypeToken),
    /// An ordered list of concrete types, each serving every contract
    ToConcreteList(Vec<TypeToken>),
}

/// One declarative binding.
///
/// An entry names one or more contracts, a production recipe, a lifetime, an
/// optional instance qualifier and an eager flag. Entries are immutable once
/// registered.
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContractId, Lifetime, Production, TypeToken};
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
/// struct File;
///
/// let entry = BindingEntry::bind::<dyn Reader>()
///     .and::<dyn Writer>()
///     .to::<File>()
///     .as_single_with("disk")
///     .non_lazy();
///
/// assert_eq!(entry.contracts().len(), 2);
/// assert_eq!(entry.production(), &Production::ToConcrete(TypeToken::of::<File>()));
/// assert_eq!(entry.lifetime_policy(), Lifetime::Singleton);
/// assert_eq!(entry.instance_qualifier(), Some("disk"));
/// assert!(entry.is_eager());
/// ```
#[derive(Debug, Clone)]
pub struct BindingEntry {
    contracts: ContractSet,
    production: Production,
    lifetime: Lifetime,
    qualifier: Option<Arc<str>>,
    eager: bool,
}

impl BindingEntry {
    /// Starts an entry for the unqualified contract `C`, bound to itself and
    /// transient until told otherwise.
    pub fn bind<C: ?Sized + 'static>() -> Self {
        Self::bind_contract(ContractId::of::<C>())
    }

    /// Starts an entry for an explicit contract identifier.
    pub fn bind_contract(contract: ContractId) -> Self {
        Self::bind_all([contract])
    }

    /// Starts an entry for several contracts at once. Duplicates collapse.
    pub fn bind_all(contracts: impl IntoIterator<Item = ContractId>) -> Self {
        let mut entry = Self {
            contracts: SmallVec::new(),
            production: Production::ToSelf,
            lifetime: Lifetime::Transient,
            qualifier: None,
            eager: false,
        };
        for contract in contracts {
            entry.push_contract(contract);
        }
        entry
    }

    /// Adds the unqualified contract `C`.
    pub fn and<C: ?Sized + 'static>(self) -> Self {
        self.and_contract(ContractId::of::<C>())
    }

    pub fn and_contract(mut self, contract: ContractId) -> Self {
        self.push_contract(contract);
        self
    }

    fn push_contract(&mut self, contract: ContractId) {
        if !self.contracts.contains(&contract) {
            self.contracts.push(contract);
        }
    }

    /// Qualifies every contract of the entry; lookups must then ask for the
    /// same qualifier.
    pub fn with_id(mut self, qualifier: impl Into<Arc<str>>) -> Self {
        let qualifier: Arc<str> = qualifier.into();
        let contracts = std::mem::take(&mut self.contracts);
        for contract in contracts {
            self.push_contract(contract.qualified(qualifier.clone()));
        }
        self
    }

    pub fn to_self(mut self) -> Self {
        self.production = Production::ToSelf;
        self
    }

    /// Produces concrete type `T` for every contract.
    pub fn to<T: ?Sized + 'static>(self) -> Self {
        self.to_token(TypeToken::of::<T>())
    }

    pub fn to_token(mut self, concrete: TypeToken) -> Self {
        self.production = Production::ToConcrete(concrete);
        self
    }

    /// Produces each listed concrete type, in order, for every contract.
    pub fn to_list(mut self, concretes: impl IntoIterator<Item = TypeToken>) -> Self {
        self.production = Production::ToConcreteList(concretes.into_iter().collect());
        self
    }

    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn as_transient(self) -> Self {
        self.lifetime(Lifetime::Transient)
    }

    pub fn as_cached(self) -> Self {
        self.lifetime(Lifetime::Cached)
    }

    pub fn as_single(self) -> Self {
        self.lifetime(Lifetime::Singleton)
    }

    /// Singleton keyed by (concrete type, `qualifier`).
    pub fn as_single_with(self, qualifier: impl Into<Arc<str>>) -> Self {
        self.as_single().qualifier(qualifier)
    }

    /// Sets the instance qualifier shared by every concrete type of the entry.
    pub fn qualifier(mut self, qualifier: impl Into<Arc<str>>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Marks the entry for construction during validation.
    pub fn non_lazy(mut self) -> Self {
        self.eager = true;
        self
    }

    pub fn contracts(&self) -> &[ContractId] {
        &self.contracts
    }

    pub fn production(&self) -> &Production {
        &self.production
    }

    pub fn lifetime_policy(&self) -> Lifetime {
        self.lifetime
    }

    pub fn instance_qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub(crate) fn qualifier_arc(&self) -> Option<&Arc<str>> {
        self.qualifier.as_ref()
    }

    pub fn is_eager(&self) -> bool {
        self.eager
    }
}
