//! Contract registry: binding entries expanded into providers and indexed
//! by contract.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;
use tracing::warn;

use crate::binding::{BindingEntry, ContractSet, Production};
use crate::key::{ContractId, TypeToken};
use crate::lifetime::Lifetime;

/// Identifies one provider: the entry it came from and its position in
/// that entry's expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderId {
    pub entry: usize,
    pub index: usize,
}

/// A post-expansion binding entry producing exactly one concrete type.
#[derive(Debug, Clone)]
pub(crate) struct Provider {
    pub(crate) id: ProviderId,
    pub(crate) contracts: ContractSet,
    pub(crate) concrete: TypeToken,
    pub(crate) lifetime: Lifetime,
    pub(crate) qualifier: Option<Arc<str>>,
    pub(crate) eager: bool,
}

/// Binding registry holding every provider in declaration order
#[derive(Default)]
pub(crate) struct Registry {
    entries: usize,
    providers: Vec<Provider>,
    /// Contract -> provider positions, in declaration order
    index: HashMap<ContractId, Vec<usize>, RandomState>,
}

impl Registry {
    /// Expands `entry` and indexes its providers under every contract.
    ///
    /// Nothing is validated here: duplicates and contracts nobody can build
    /// are legal until something asks for an instance.
    pub(crate) fn register(&mut self, entry: BindingEntry) {
        let entry_index = self.entries;
        self.entries += 1;

        if entry.contracts().is_empty() {
            warn!(entry = entry_index, "binding entry declares no contracts; ignored");
            return;
        }

        match entry.production() {
            Production::ToSelf => {
                // One provider per contract, each serving only itself
                for (index, contract) in entry.contracts().iter().enumerate() {
                    let mut contracts = ContractSet::new();
                    contracts.push(contract.clone());
                    self.push(&entry, index, contracts, contract.token());
                }
            }
            Production::ToConcrete(concrete) => {
                self.push(&entry, 0, entry.contracts().iter().cloned().collect(), *concrete);
            }
            Production::ToConcreteList(concretes) => {
                if concretes.is_empty() {
                    warn!(entry = entry_index, "binding entry lists no concrete types; no providers produced");
                }
                for (index, concrete) in concretes.iter().enumerate() {
                    self.push(&entry, index, entry.contracts().iter().cloned().collect(), *concrete);
                }
            }
        }
    }

    fn push(&mut self, entry: &BindingEntry, index: usize, contracts: ContractSet, concrete: TypeToken) {
        let position = self.providers.len();
        for contract in &contracts {
            self.index.entry(contract.clone()).or_default().push(position);
        }
        self.providers.push(Provider {
            id: ProviderId { entry: self.entries - 1, index },
            contracts,
            concrete,
            lifetime: entry.lifetime_policy(),
            qualifier: entry.qualifier_arc().cloned(),
            eager: entry.is_eager(),
        });
    }

    /// Providers satisfying `contract`, in declaration order.
    pub(crate) fn lookup<'r>(&'r self, contract: &ContractId) -> impl ExactSizeIterator<Item = &'r Provider> + 'r {
        self.index
            .get(contract)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(move |&position| &self.providers[position])
    }

    pub(crate) fn count(&self, contract: &ContractId) -> usize {
        self.index.get(contract).map_or(0, Vec::len)
    }

    pub(crate) fn contains(&self, contract: &ContractId) -> bool {
        self.count(contract) > 0
    }

    /// Every provider, in declaration order.
    pub(crate) fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Every indexed contract with its provider count.
    #[cfg_attr(not(feature = "diagnostics"), allow(dead_code))]
    pub(crate) fn contracts(&self) -> impl Iterator<Item = (&ContractId, usize)> {
        self.index.iter().map(|(contract, positions)| (contract, positions.len()))
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.entries
    }
}
