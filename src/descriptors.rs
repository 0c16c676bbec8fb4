//! Provider descriptors for introspection and diagnostics.

use crate::key::{ContractId, TypeToken};
use crate::lifetime::Lifetime;
use crate::registration::{Provider, ProviderId};

/// Read-only description of one provider.
///
/// Descriptors are what the registry holds after expansion: one per concrete
/// type produced, listing every contract it answers to.
///
/// # Examples
///
/// ```rust
/// use bindweave::{BindingEntry, ContainerBuilder, ContractId, Lifetime, TypeToken};
///
/// trait Cache: Send + Sync {}
/// struct Memory;
/// struct Redis;
///
/// let mut builder = ContainerBuilder::new();
/// builder.register(
///     BindingEntry::bind::<dyn Cache>()
///         .to_list([TypeToken::of::<Memory>(), TypeToken::of::<Redis>()])
///         .as_single(),
/// );
///
/// let container = builder.build();
/// let descriptors = container.descriptors();
/// assert_eq!(descriptors.len(), 2);
/// assert_eq!(descriptors[1].concrete, TypeToken::of::<Redis>());
/// assert_eq!(descriptors[1].lifetime, Lifetime::Singleton);
/// assert!(descriptors[1].serves(&ContractId::of::<dyn Cache>()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    pub id: ProviderId,
    pub contracts: Vec<ContractId>,
    pub concrete: TypeToken,
    pub lifetime: Lifetime,
    /// Instance qualifier taking part in singleton identity
    pub qualifier: Option<String>,
    pub eager: bool,
}

impl BindingDescriptor {
    pub(crate) fn from_provider(provider: &Provider) -> Self {
        Self {
            id: provider.id,
            contracts: provider.contracts.to_vec(),
            concrete: provider.concrete,
            lifetime: provider.lifetime,
            qualifier: provider.qualifier.as_deref().map(str::to_owned),
            eager: provider.eager,
        }
    }

    pub fn serves(&self, contract: &ContractId) -> bool {
        self.contracts.contains(contract)
    }

    pub fn concrete_name(&self) -> &'static str {
        self.concrete.name()
    }

    /// Human readable one-line summary.
    pub fn summary(&self) -> String {
        let contracts: Vec<String> = self.contracts.iter().map(ToString::to_string).collect();
        let mut line = format!(
            "[{}.{}] {} -> {} ({:?})",
            self.id.entry,
            self.id.index,
            contracts.join(", "),
            self.concrete,
            self.lifetime
        );
        if let Some(qualifier) = &self.qualifier {
            line.push_str(&format!(" qualifier={}", qualifier));
        }
        if self.eager {
            line.push_str(" eager");
        }
        line
    }
}
