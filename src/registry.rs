//! Registry mapping pool keys to pools

use crate::arena::{ResourceArena, ResourceId};
use crate::config::PoolConfiguration;
use crate::errors::{NotFoundReason, PoolError, PoolResult};
use crate::hooks::PoolHooks;
use crate::metrics::RegistryMetrics;
use crate::pool::{ObjectPool, PoolMut, ReleaseOutcome};
use crate::record::{PoolKey, ResourceRecord};

use std::collections::HashMap;
use tracing::{error, info};

/// Predicate deciding whether a pool survives a maintenance sweep
pub type KeepPredicate<'a, T> = &'a dyn Fn(&ObjectPool<T>) -> bool;

/// Owner of every keyed pool and of the resources they hand out
///
/// The registry is meant to be driven from a single thread (a host update
/// loop). Once [`shutdown`](Self::shutdown) has begun, every mutating
/// operation is a no-op.
///
/// # Examples
///
/// ```
/// use esox_keyedpool::{PoolConfiguration, PoolHooks, PoolRegistry, ReleaseOutcome};
///
/// let mut registry = PoolRegistry::new();
/// let bullet = registry
///     .get_or_create_pool("bullets", PoolHooks::new(|| [0.0f32; 2]), PoolConfiguration::default())
///     .map(|mut pool| pool.acquire())
///     .unwrap();
///
/// registry.get_mut(bullet).unwrap()[0] = 4.0;
/// assert_eq!(registry.release(bullet, None).unwrap(), ReleaseOutcome::Idle);
/// assert_eq!(registry.pool("bullets").unwrap().idle_count(), 1);
/// ```
pub struct PoolRegistry<T> {
    pools: HashMap<PoolKey, ObjectPool<T>>,
    arena: ResourceArena<T>,
    shutting_down: bool,
}

impl<T> PoolRegistry<T> {
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
            arena: ResourceArena::new(),
            shutting_down: false,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Resources tracked by the registry, idle or outstanding
    pub fn resource_count(&self) -> usize {
        self.arena.len()
    }

    pub fn contains_pool(&self, key: &str) -> bool {
        self.pools.contains_key(key)
    }

    pub fn pool(&self, key: &str) -> Option<&ObjectPool<T>> {
        if self.shutting_down {
            return None;
        }
        self.pools.get(key)
    }

    pub fn pool_mut(&mut self, key: &str) -> Option<PoolMut<'_, T>> {
        if self.shutting_down {
            return None;
        }
        let pool = self.pools.get_mut(key)?;
        Some(PoolMut::new(pool, &mut self.arena))
    }

    /// Return the pool registered under `key`, creating it on first use
    ///
    /// The hooks and configuration only take effect when the pool is created;
    /// later calls for the same key get the existing pool. Returns `None`
    /// while shutting down.
    pub fn get_or_create_pool(
        &mut self,
        key: &str,
        hooks: PoolHooks<T>,
        config: PoolConfiguration,
    ) -> Option<PoolMut<'_, T>> {
        self.get_or_create_pool_with(key, hooks, config, |_, _| {})
    }

    /// Like [`get_or_create_pool`](Self::get_or_create_pool), calling
    /// `on_added` once if the pool is created by this call
    pub fn get_or_create_pool_with<F>(
        &mut self,
        key: &str,
        hooks: PoolHooks<T>,
        config: PoolConfiguration,
        on_added: F,
    ) -> Option<PoolMut<'_, T>>
    where
        F: FnOnce(&PoolKey, &mut ObjectPool<T>),
    {
        if self.shutting_down {
            return None;
        }

        if !self.pools.contains_key(key) {
            let key = PoolKey::from(key);
            let mut pool = ObjectPool::new(key.clone(), hooks, config);
            on_added(&key, &mut pool);
            info!(pool = %key, config = %pool.config(), "pool created");
            self.pools.insert(key, pool);
        }

        let pool = self.pools.get_mut(key)?;
        Some(PoolMut::new(pool, &mut self.arena))
    }

    /// Acquire from an existing pool
    pub fn acquire(&mut self, key: &str) -> Option<ResourceId> {
        self.pool_mut(key).map(|mut pool| pool.acquire())
    }

    /// Adopt a resource constructed outside any pool
    ///
    /// The resource counts as taken and has no pool key until it is released
    /// with [`release_with_key`](Self::release_with_key).
    pub fn track(&mut self, value: T) -> Option<ResourceId> {
        if self.shutting_down {
            return None;
        }
        let mut record = ResourceRecord::new();
        record.on_taken();
        Some(self.arena.insert(value, record))
    }

    pub fn contains_resource(&self, id: ResourceId) -> bool {
        self.arena.contains(id)
    }

    pub fn get(&self, id: ResourceId) -> Option<&T> {
        self.arena.slot(id).map(|slot| &slot.value)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut T> {
        self.arena.slot_mut(id).map(|slot| &mut slot.value)
    }

    pub fn record(&self, id: ResourceId) -> Option<&ResourceRecord> {
        self.arena.slot(id).map(|slot| &slot.record)
    }

    /// Release a resource to the pool named in its record
    ///
    /// `caller` only labels the log events. Absent handles are ignored; a
    /// record without a key, or a key with no registered pool, is reported
    /// as [`PoolError::NotFound`] and nothing changes.
    pub fn release(&mut self, id: ResourceId, caller: Option<&str>) -> PoolResult<ReleaseOutcome> {
        if self.shutting_down {
            return Ok(ReleaseOutcome::Ignored);
        }

        let Some(slot) = self.arena.slot(id) else {
            return Ok(ReleaseOutcome::Ignored);
        };
        let Some(key) = slot.record.key().cloned() else {
            let err = PoolError::NotFound(NotFoundReason::UnboundRecord);
            error!(resource = ?id, caller, %err, "release failed");
            return Err(err);
        };

        self.release_to(key.as_str(), id, caller)
    }

    /// Release a resource to the pool registered under `key`
    pub fn release_with_key(&mut self, key: &str, id: ResourceId) -> PoolResult<ReleaseOutcome> {
        if self.shutting_down {
            return Ok(ReleaseOutcome::Ignored);
        }
        self.release_to(key, id, None)
    }

    fn release_to(
        &mut self,
        key: &str,
        id: ResourceId,
        caller: Option<&str>,
    ) -> PoolResult<ReleaseOutcome> {
        match self.pools.get_mut(key) {
            Some(pool) => pool.release(&mut self.arena, id, caller),
            None => {
                let err = PoolError::NotFound(NotFoundReason::UnknownPool(PoolKey::from(key)));
                error!(resource = ?id, caller, %err, "release failed");
                Err(err)
            }
        }
    }

    /// Destroy the idle resources of every pool not kept by `should_keep`
    ///
    /// Returns the number of resources destroyed.
    pub fn release_unused(&mut self, should_keep: Option<KeepPredicate<'_, T>>) -> usize {
        if self.shutting_down {
            return 0;
        }

        let mut destroyed = 0;
        for pool in self.pools.values_mut() {
            if !should_keep.is_some_and(|keep| keep(&*pool)) {
                destroyed += pool.release_unused(&mut self.arena);
            }
        }
        destroyed
    }

    /// Remove pools that hold nothing: no outstanding and no idle resources
    ///
    /// Pools with idle resources survive; drain them with
    /// [`release_unused`](Self::release_unused) first. Returns the removed keys.
    pub fn destroy_unused(&mut self, should_keep: Option<KeepPredicate<'_, T>>) -> Vec<PoolKey> {
        if self.shutting_down {
            return Vec::new();
        }

        let mut unused: Vec<PoolKey> = self
            .pools
            .values()
            .filter(|pool| pool.outstanding_count() == 0 && pool.idle_count() == 0)
            .filter(|pool| !should_keep.is_some_and(|keep| keep(*pool)))
            .map(|pool| pool.key().clone())
            .collect();
        unused.sort();

        for key in &unused {
            if let Some(pool) = self.pools.remove(key) {
                info!(pool = %key, taken = pool.total_taken(), "unused pool destroyed");
            }
        }
        unused
    }

    /// [`release_unused`](Self::release_unused) then
    /// [`destroy_unused`](Self::destroy_unused) with the same predicate
    pub fn release_and_destroy_unused(
        &mut self,
        should_keep: Option<KeepPredicate<'_, T>>,
    ) -> Vec<PoolKey> {
        if self.shutting_down {
            return Vec::new();
        }
        self.release_unused(should_keep);
        self.destroy_unused(should_keep)
    }

    /// Begin teardown and destroy every remaining resource
    ///
    /// Idempotent. After the first call all public operations are no-ops.
    pub fn shutdown(&mut self) {
        if self.shutting_down {
            return;
        }
        self.shutting_down = true;

        for (key, mut pool) in self.pools.drain() {
            let outstanding = pool.outstanding_count();
            let idle = pool.idle_count();
            let destroyed = pool.teardown(&mut self.arena);
            info!(pool = %key, outstanding, idle, destroyed, "pool destroyed");
        }

        // Whatever remains was adopted but never bound to a pool
        let orphans = self.arena.drain_where(|_| true).len();
        if orphans > 0 {
            info!(orphans, "dropped unbound resources");
        }
    }

    pub fn metrics(&self) -> RegistryMetrics {
        let mut pools: Vec<_> = self.pools.values().map(ObjectPool::metrics).collect();
        pools.sort_by(|a, b| a.pool.cmp(&b.pool));

        RegistryMetrics {
            pools,
            tracked_resources: self.arena.len(),
            shutting_down: self.shutting_down,
        }
    }
}

impl<T> Default for PoolRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for PoolRegistry<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
