//! Per-key pool with a bounded free list

use crate::arena::{ResourceArena, ResourceId};
use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::hooks::{PoolHooks, Transfer};
use crate::metrics::PoolMetrics;
use crate::record::{PoolKey, ResourceRecord};

use std::ops::Deref;
use tracing::{debug, error, warn};

/// What happened to a resource handed back to its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Parked in the free list for reuse
    Idle,

    /// Free list was full; the resource was disposed
    Destroyed,

    /// Absent handle, already-free resource, or registry shutting down
    Ignored,
}

#[derive(Debug, Default, Clone, Copy)]
struct PoolCounters {
    total_taken: u64,
    total_created: u64,
    total_destroyed: u64,
    destroy_failures: u64,
}

/// Inventory of one pool key
///
/// Resources themselves live in the registry's arena; the pool owns the
/// free list, the lifecycle hooks and the counters. Mutation goes through
/// [`PoolMut`], which pairs the pool with the arena.
pub struct ObjectPool<T> {
    key: PoolKey,
    config: PoolConfiguration,
    capacity: usize,
    hooks: PoolHooks<T>,
    free: Vec<ResourceId>,
    outstanding: usize,
    counters: PoolCounters,
}

impl<T> ObjectPool<T> {
    pub(crate) fn new(key: PoolKey, hooks: PoolHooks<T>, config: PoolConfiguration) -> Self {
        let capacity = if config.max_size == 0 {
            warn!(pool = %key, "max_size of 0 clamped to 1");
            1
        } else {
            config.max_size
        };

        Self {
            key,
            config,
            capacity,
            hooks,
            free: Vec::new(),
            outstanding: 0,
            counters: PoolCounters::default(),
        }
    }

    pub fn key(&self) -> &PoolKey {
        &self.key
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.config
    }

    /// Maximum size of the free list
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resources currently handed out
    pub fn outstanding_count(&self) -> usize {
        self.outstanding
    }

    /// Resources waiting in the free list
    pub fn idle_count(&self) -> usize {
        self.free.len()
    }

    pub fn total_taken(&self) -> u64 {
        self.counters.total_taken
    }

    pub fn total_created(&self) -> u64 {
        self.counters.total_created
    }

    pub fn total_destroyed(&self) -> u64 {
        self.counters.total_destroyed
    }

    pub fn destroy_failures(&self) -> u64 {
        self.counters.destroy_failures
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            pool: self.key.to_string(),
            outstanding: self.outstanding,
            idle: self.free.len(),
            capacity: self.capacity,
            total_taken: self.counters.total_taken,
            total_created: self.counters.total_created,
            total_destroyed: self.counters.total_destroyed,
            destroy_failures: self.counters.destroy_failures,
        }
    }

    pub(crate) fn acquire(&mut self, arena: &mut ResourceArena<T>) -> ResourceId {
        let transfer = transfer(&self.key, &self.config);

        // LIFO: the most recently released resource is the warmest
        let reused = loop {
            let Some(id) = self.free.pop() else {
                break None;
            };
            if let Some(slot) = arena.slot_mut(id) {
                slot.idle = false;
                self.hooks.prepare_for_use(&mut slot.value, &transfer);
                break Some(id);
            }
        };

        let id = match reused {
            Some(id) => id,
            None => {
                let mut value = self.hooks.create();
                self.hooks.prepare_for_use(&mut value, &transfer);
                self.counters.total_created += 1;
                let id = arena.insert(value, ResourceRecord::for_pool(self.key.clone()));
                debug!(pool = %self.key, resource = ?id, "created resource");
                id
            }
        };

        if self.config.update_record_on_transfer {
            if let Some(slot) = arena.slot_mut(id) {
                slot.record.on_taken();
            }
        }
        self.outstanding += 1;
        self.counters.total_taken += 1;

        debug!(pool = %self.key, resource = ?id, outstanding = self.outstanding, "acquired");
        id
    }

    pub(crate) fn release(
        &mut self,
        arena: &mut ResourceArena<T>,
        id: ResourceId,
        caller: Option<&str>,
    ) -> PoolResult<ReleaseOutcome> {
        let Some(slot) = arena.slot_mut(id) else {
            return Ok(ReleaseOutcome::Ignored);
        };
        if slot.idle {
            return Ok(ReleaseOutcome::Ignored);
        }

        // A resource adopted from outside has no key yet; it joins this pool
        // but was never counted as outstanding here.
        let adopted = slot.record.key().is_none();
        if let Err(err) = slot.record.setup(self.key.clone()) {
            error!(pool = %self.key, resource = ?id, caller, %err, "release refused");
            return Err(err);
        }

        let transfer = transfer(&self.key, &self.config);
        self.hooks.prepare_for_idle(&mut slot.value, &transfer);
        if self.config.update_record_on_transfer {
            slot.record.on_released();
        }
        if !adopted {
            self.outstanding = self.outstanding.saturating_sub(1);
        }

        if self.free.len() < self.capacity {
            slot.idle = true;
            self.free.push(id);
            debug!(pool = %self.key, resource = ?id, caller, idle = self.free.len(), "released");
            return Ok(ReleaseOutcome::Idle);
        }

        debug!(pool = %self.key, resource = ?id, caller, "free list full, destroying");
        if let Some(slot) = arena.remove(id) {
            self.dispose(slot.value);
        }
        Ok(ReleaseOutcome::Destroyed)
    }

    /// Destroy every idle resource; outstanding ones are untouched
    pub(crate) fn release_unused(&mut self, arena: &mut ResourceArena<T>) -> usize {
        let mut destroyed = 0;
        for id in std::mem::take(&mut self.free) {
            if let Some(slot) = arena.remove(id) {
                self.dispose(slot.value);
                destroyed += 1;
            }
        }
        if destroyed > 0 {
            debug!(pool = %self.key, destroyed, "released unused resources");
        }
        destroyed
    }

    /// Pre-create idle resources, never beyond capacity
    pub(crate) fn warmup(&mut self, arena: &mut ResourceArena<T>, count: usize) -> usize {
        let room = self.capacity.saturating_sub(self.free.len());
        let transfer = transfer(&self.key, &self.config);
        let mut created = 0;

        for _ in 0..count.min(room) {
            let mut value = self.hooks.create();
            self.hooks.prepare_for_idle(&mut value, &transfer);
            self.counters.total_created += 1;

            let id = arena.insert(value, ResourceRecord::for_pool(self.key.clone()));
            if let Some(slot) = arena.slot_mut(id) {
                slot.idle = true;
            }
            self.free.push(id);
            created += 1;
        }
        created
    }

    /// Destroy idle and outstanding resources of this pool
    pub(crate) fn teardown(&mut self, arena: &mut ResourceArena<T>) -> usize {
        let mut destroyed = self.release_unused(arena);
        let key = self.key.clone();
        for (_, slot) in arena.drain_where(|slot| slot.record.key() == Some(&key)) {
            self.dispose(slot.value);
            destroyed += 1;
        }
        self.outstanding = 0;
        destroyed
    }

    fn dispose(&mut self, value: T) {
        self.counters.total_destroyed += 1;
        if let Err(reason) = self.hooks.destroy(value) {
            self.counters.destroy_failures += 1;
            let err = PoolError::Destroy {
                pool: self.key.clone(),
                reason,
            };
            error!(pool = %self.key, %err, "destroy hook failed");
        }
    }
}

fn transfer<'a>(key: &'a PoolKey, config: &PoolConfiguration) -> Transfer<'a> {
    Transfer {
        key,
        relocate: config.relocate_on_transfer,
        activate: config.activate_on_acquire,
    }
}

/// Mutable access to one pool together with the resources it manages
///
/// Obtained from [`PoolRegistry`](crate::PoolRegistry); dereferences to the
/// pool for the read-only observers.
pub struct PoolMut<'a, T> {
    pool: &'a mut ObjectPool<T>,
    arena: &'a mut ResourceArena<T>,
}

impl<'a, T> PoolMut<'a, T> {
    pub(crate) fn new(pool: &'a mut ObjectPool<T>, arena: &'a mut ResourceArena<T>) -> Self {
        Self { pool, arena }
    }

    /// Hand out an idle resource, constructing one on a free-list miss
    pub fn acquire(&mut self) -> ResourceId {
        self.pool.acquire(self.arena)
    }

    /// Return a resource to this pool
    ///
    /// Unknown or already-free handles are ignored. A resource bound to a
    /// different pool is refused with [`PoolError::Configuration`].
    pub fn release(&mut self, id: ResourceId) -> PoolResult<ReleaseOutcome> {
        self.pool.release(self.arena, id, None)
    }

    /// Destroy all idle resources, returning how many were destroyed
    pub fn release_unused(&mut self) -> usize {
        self.pool.release_unused(self.arena)
    }

    /// Pre-create up to `count` idle resources
    pub fn warmup(&mut self, count: usize) -> usize {
        self.pool.warmup(self.arena, count)
    }

    pub fn get(&self, id: ResourceId) -> Option<&T> {
        self.arena.slot(id).map(|slot| &slot.value)
    }

    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut T> {
        self.arena.slot_mut(id).map(|slot| &mut slot.value)
    }
}

impl<T> Deref for PoolMut<'_, T> {
    type Target = ObjectPool<T>;

    fn deref(&self) -> &Self::Target {
        &*self.pool
    }
}
