//! Instance cache with per-identity construction locks.
//!
//! Each identity owns a slot holding a `OnceCell<Instance>` and a build gate.
//! Slots are created under a short shard write lock; construction then runs
//! while holding the slot's gate, never under the shard lock. Two callers
//! racing for the same identity therefore run exactly one factory and see the
//! same instance, while unrelated identities construct in parallel.
//!
//! A small wait-for graph records which thread is building which identity
//! and which identity each blocked thread waits on. A caller about to block
//! walks that chain first; if it leads back to the caller, the threads are
//! resolving a cycle from both ends and the caller fails with
//! `CyclicDependency` instead of waiting forever.

use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use ahash::RandomState;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::{debug, trace};

use crate::error::{DiError, DiResult};
use crate::instance::Instance;
use crate::key::TypeToken;
use crate::registration::ProviderId;

/// Number of shards. Powers of 2 work best for hash distribution.
const SHARD_COUNT: usize = 16;

/// Sharing key of a cached instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// One instance per provider
    Cached(ProviderId),
    /// One instance per (concrete type, qualifier)
    Singleton(TypeToken, Option<Arc<str>>),
}

#[derive(Default)]
struct Slot {
    value: OnceCell<Instance>,
    gate: Mutex<()>,
}

type Shard = RwLock<HashMap<Identity, Arc<Slot>, RandomState>>;

/// Who builds what, and who waits on what.
#[derive(Default)]
struct WaitGraph {
    builders: HashMap<Identity, (ThreadId, TypeToken), RandomState>,
    waiting: HashMap<ThreadId, Identity, RandomState>,
}

impl WaitGraph {
    /// Follows the chain starting at `wanted`. Returns the concrete types on
    /// it when the chain ends at a slot `me` is building.
    fn cycle_through(&self, wanted: &Identity, me: ThreadId) -> Option<Vec<&'static str>> {
        let mut names = Vec::new();
        let mut next = wanted;
        while names.len() <= self.builders.len() {
            let (owner, concrete) = self.builders.get(next)?;
            names.push(concrete.name());
            if *owner == me {
                let first = names[0];
                names.push(first);
                return Some(names);
            }
            next = self.waiting.get(owner)?;
        }
        None
    }
}

/// Keeps `identity` registered as built by the current thread until dropped.
struct BuildGuard<'c> {
    graph: &'c Mutex<WaitGraph>,
    identity: &'c Identity,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.graph.lock().builders.remove(self.identity);
    }
}

/// Container-owned store of cached and singleton instances. Never evicts.
pub struct InstanceCache {
    hasher: RandomState,
    shards: [Shard; SHARD_COUNT],
    graph: Mutex<WaitGraph>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self {
            hasher: RandomState::new(),
            shards: std::array::from_fn(|_| RwLock::new(HashMap::default())),
            graph: Mutex::new(WaitGraph::default()),
        }
    }

    /// Returns the instance for `identity`, running `factory` to build a
    /// `concrete` if there is none yet.
    ///
    /// At most one factory call per identity succeeds, even when several
    /// threads arrive before the first finishes; late arrivals block on the
    /// identity's gate and receive the winner's instance. A failing factory
    /// leaves the slot empty, so a later call tries again. Blocking on a slot
    /// whose builder is itself waiting, directly or through other threads,
    /// on a slot the caller builds fails with `CyclicDependency`.
    pub fn get_or_create<F>(&self, identity: &Identity, concrete: TypeToken, factory: F) -> DiResult<Instance>
    where
        F: FnOnce() -> DiResult<Instance>,
    {
        let slot = self.slot(identity);
        if let Some(instance) = slot.value.get() {
            trace!(?identity, "instance cache hit");
            return Ok(instance.clone());
        }

        let _gate = match slot.gate.try_lock() {
            Some(gate) => gate,
            None => self.wait_for(identity, &slot)?,
        };
        if let Some(instance) = slot.value.get() {
            return Ok(instance.clone());
        }

        self.graph
            .lock()
            .builders
            .insert(identity.clone(), (thread::current().id(), concrete));
        let built = {
            let _building = BuildGuard { graph: &self.graph, identity };
            factory()?
        };
        Ok(slot.value.get_or_init(|| built).clone())
    }

    fn wait_for<'s>(&self, identity: &Identity, slot: &'s Slot) -> DiResult<MutexGuard<'s, ()>> {
        let me = thread::current().id();
        {
            let mut graph = self.graph.lock();
            if let Some(path) = graph.cycle_through(identity, me) {
                debug!(?identity, ?path, "cross-thread cycle detected");
                return Err(DiError::CyclicDependency(path));
            }
            graph.waiting.insert(me, identity.clone());
        }

        let gate = slot.gate.lock();
        self.graph.lock().waiting.remove(&me);
        Ok(gate)
    }

    /// Gets an existing instance without constructing.
    pub fn get(&self, identity: &Identity) -> Option<Instance> {
        let shard = self.shard(identity).read();
        shard.get(identity)?.value.get().cloned()
    }

    /// Number of constructed instances.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().values().filter(|slot| slot.value.get().is_some()).count())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, identity: &Identity) -> Arc<Slot> {
        let shard = self.shard(identity);
        if let Some(slot) = shard.read().get(identity) {
            return slot.clone();
        }
        shard.write().entry(identity.clone()).or_default().clone()
    }

    fn shard(&self, identity: &Identity) -> &Shard {
        let mut hasher = self.hasher.build_hasher();
        identity.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }
}

impl Default for InstanceCache {
    fn default() -> Self {
        Self::new()
    }
}
