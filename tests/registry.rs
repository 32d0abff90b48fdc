use esox_keyedpool::{
    DestroyFailure, NotFoundReason, PoolConfiguration, PoolError, PoolHooks, PoolKey,
    PoolRegistry, ReleaseOutcome, ResourceId, ResourceState,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Probe {
    created: Cell<u32>,
    acquired: Cell<u32>,
    released: Cell<u32>,
    destroyed: RefCell<Vec<u32>>,
}

fn probed_hooks(probe: &Rc<Probe>) -> PoolHooks<u32> {
    let on_create = Rc::clone(probe);
    let on_acquire = Rc::clone(probe);
    let on_release = Rc::clone(probe);
    let on_destroy = Rc::clone(probe);

    PoolHooks::new(move || {
        on_create.created.set(on_create.created.get() + 1);
        on_create.created.get()
    })
    .on_acquire(move |_, _| on_acquire.acquired.set(on_acquire.acquired.get() + 1))
    .on_release(move |_, _| on_release.released.set(on_release.released.get() + 1))
    .on_destroy(move |value| {
        on_destroy.destroyed.borrow_mut().push(value);
        Ok(())
    })
}

fn registry_with_pool(key: &str, max_size: usize) -> (PoolRegistry<u32>, Rc<Probe>) {
    let probe = Rc::new(Probe::default());
    let mut registry = PoolRegistry::new();
    registry.get_or_create_pool(
        key,
        probed_hooks(&probe),
        PoolConfiguration::new().with_max_size(max_size),
    );
    (registry, probe)
}

#[test]
fn test_overflow_example() {
    let (mut registry, probe) = registry_with_pool("bullets", 2);

    let ids: Vec<ResourceId> = (0..3).map(|_| registry.acquire("bullets").unwrap()).collect();
    assert_eq!(probe.created.get(), 3);
    assert_eq!(registry.pool("bullets").unwrap().outstanding_count(), 3);
    assert_eq!(ids.iter().filter_map(|id| registry.get(*id)).count(), 3);

    for id in &ids {
        registry.release(*id, None).unwrap();
    }

    let pool = registry.pool("bullets").unwrap();
    assert_eq!(pool.idle_count(), 2);
    assert_eq!(pool.outstanding_count(), 0);
    assert_eq!(probe.destroyed.borrow().len(), 1);
}

#[test]
fn test_outstanding_tracks_acquires_minus_releases() {
    let (mut registry, _) = registry_with_pool("p", 3);
    let mut held = Vec::new();
    let mut acquires = 0usize;
    let mut releases = 0usize;

    // acquire-heavy, then release-heavy, interleaved
    for step in 0..40 {
        if step % 3 != 2 || held.is_empty() {
            held.push(registry.acquire("p").unwrap());
            acquires += 1;
        } else {
            let id = held.remove(step % held.len());
            registry.release(id, None).unwrap();
            releases += 1;
        }
        let pool = registry.pool("p").unwrap();
        assert_eq!(pool.outstanding_count(), acquires - releases);
        assert!(pool.idle_count() <= pool.capacity());
    }

    while let Some(id) = held.pop() {
        registry.release(id, None).unwrap();
        let pool = registry.pool("p").unwrap();
        assert!(pool.idle_count() <= 3);
    }
    assert_eq!(registry.pool("p").unwrap().outstanding_count(), 0);
}

#[test]
fn test_get_or_create_is_idempotent_and_lazy() {
    let first = Rc::new(Probe::default());
    let second = Rc::new(Probe::default());
    let mut registry = PoolRegistry::new();

    registry.get_or_create_pool("x", probed_hooks(&first), PoolConfiguration::default());
    registry.get_or_create_pool("x", probed_hooks(&second), PoolConfiguration::new().with_max_size(1));

    assert_eq!(registry.pool_count(), 1);
    assert_eq!(first.created.get(), 0);
    assert_eq!(registry.pool("x").unwrap().capacity(), 100);

    registry.acquire("x").unwrap();
    assert_eq!(first.created.get(), 1);
    assert_eq!(second.created.get(), 0);
}

#[test]
fn test_destroy_unused_requires_drained_pool() {
    let (mut registry, probe) = registry_with_pool("fx", 10);
    let ids: Vec<_> = (0..3).map(|_| registry.acquire("fx").unwrap()).collect();
    for id in ids {
        registry.release(id, None).unwrap();
    }
    assert_eq!(registry.pool("fx").unwrap().idle_count(), 3);

    assert!(registry.destroy_unused(None).is_empty());
    assert!(registry.contains_pool("fx"));
    assert!(probe.destroyed.borrow().is_empty());

    assert_eq!(registry.release_unused(None), 3);
    assert_eq!(registry.destroy_unused(None), vec![PoolKey::from("fx")]);
    assert!(!registry.contains_pool("fx"));
    assert_eq!(probe.destroyed.borrow().len(), 3);
}

#[test]
fn test_release_and_destroy_unused_honours_keep() {
    let mut registry = PoolRegistry::new();
    for key in ["keep", "drop", "busy"] {
        let mut pool = registry
            .get_or_create_pool(key, PoolHooks::new(|| 0u8), PoolConfiguration::default())
            .unwrap();
        let id = pool.acquire();
        if key != "busy" {
            pool.release(id).unwrap();
        }
    }

    let keep = |pool: &esox_keyedpool::ObjectPool<u8>| pool.key().as_str() == "keep";
    let removed = registry.release_and_destroy_unused(Some(&keep));

    assert_eq!(removed, vec![PoolKey::from("drop")]);
    assert_eq!(registry.pool("keep").unwrap().idle_count(), 1);
    assert_eq!(registry.pool("busy").unwrap().outstanding_count(), 1);
    assert_eq!(registry.pool_count(), 2);
}

#[test]
fn test_release_unbound_record_is_not_found() {
    let (mut registry, probe) = registry_with_pool("p", 4);
    let stray = registry.track(77).unwrap();
    let before = registry.metrics();

    let err = registry.release(stray, Some("test")).unwrap_err();
    assert_eq!(err, PoolError::NotFound(NotFoundReason::UnboundRecord));

    assert_eq!(registry.metrics(), before);
    assert_eq!(probe.released.get(), 0);
    assert_eq!(registry.get(stray), Some(&77));
}

#[test]
fn test_release_stale_handle_is_ignored() {
    let (mut registry, _) = registry_with_pool("gone", 4);
    let adopted = registry.track(1).unwrap();
    assert_eq!(registry.release_with_key("gone", adopted).unwrap(), ReleaseOutcome::Idle);

    let id = registry.acquire("gone").unwrap();
    assert_eq!(id, adopted);

    registry.release(id, None).unwrap();
    assert_eq!(registry.release_and_destroy_unused(None), vec![PoolKey::from("gone")]);
    assert_eq!(registry.release(id, None).unwrap(), ReleaseOutcome::Ignored);
    assert!(!registry.contains_resource(id));
}

#[test]
fn test_record_bookkeeping_through_registry() {
    let (mut registry, probe) = registry_with_pool("p", 4);

    let id = registry.acquire("p").unwrap();
    let record = registry.record(id).unwrap();
    assert_eq!(record.key().map(PoolKey::as_str), Some("p"));
    assert_eq!(record.state(), ResourceState::Taken);
    assert_eq!(record.taken_count(), 1);

    registry.release(id, None).unwrap();
    assert_eq!(registry.release(id, None).unwrap(), ReleaseOutcome::Ignored);
    assert_eq!(registry.record(id).unwrap().state(), ResourceState::Free);
    assert_eq!(probe.released.get(), 1);

    assert_eq!(registry.acquire("p"), Some(id));
    assert_eq!(registry.record(id).unwrap().taken_count(), 2);
    assert_eq!(probe.acquired.get(), 2);
}

#[test]
fn test_destroy_failures_do_not_abort_sweep() {
    let attempts = Rc::new(Cell::new(0));
    let seen = Rc::clone(&attempts);
    let hooks = PoolHooks::new(|| 0u32).on_destroy(move |_| {
        seen.set(seen.get() + 1);
        if seen.get() % 2 == 1 {
            Err(DestroyFailure::new("handle already closed"))
        } else {
            Ok(())
        }
    });

    let mut registry = PoolRegistry::new();
    let mut pool = registry
        .get_or_create_pool("files", hooks, PoolConfiguration::default())
        .unwrap();
    let ids: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
    for id in ids {
        pool.release(id).unwrap();
    }

    assert_eq!(registry.release_unused(None), 4);
    assert_eq!(attempts.get(), 4);

    let pool = registry.pool("files").unwrap();
    assert_eq!(pool.destroy_failures(), 2);
    assert_eq!(pool.total_destroyed(), 4);
    assert_eq!(registry.resource_count(), 0);
}

#[test]
fn test_operations_after_shutdown_are_noops() {
    let (mut registry, probe) = registry_with_pool("p", 4);
    let held = registry.acquire("p").unwrap();

    registry.shutdown();
    assert!(registry.is_shutting_down());
    assert_eq!(probe.destroyed.borrow().len(), 1);

    assert!(registry.acquire("p").is_none());
    assert!(registry.track(3).is_none());
    assert_eq!(registry.release(held, None).unwrap(), ReleaseOutcome::Ignored);
    assert_eq!(registry.release_with_key("p", held).unwrap(), ReleaseOutcome::Ignored);
    assert!(
        registry
            .get_or_create_pool("q", probed_hooks(&probe), PoolConfiguration::default())
            .is_none()
    );
    assert_eq!(registry.release_unused(None), 0);
    assert!(registry.release_and_destroy_unused(None).is_empty());

    assert_eq!(registry.pool_count(), 0);
    assert_eq!(registry.resource_count(), 0);
    assert_eq!(probe.created.get(), 1);
}

#[test]
fn test_drop_tears_down() {
    let probe = Rc::new(Probe::default());
    {
        let mut registry = PoolRegistry::new();
        let mut pool = registry
            .get_or_create_pool("p", probed_hooks(&probe), PoolConfiguration::default())
            .unwrap();
        pool.warmup(2);
        pool.acquire();
    }
    assert_eq!(probe.destroyed.borrow().len(), 2);
}

#[test]
fn test_metrics_snapshot() {
    let (mut registry, _) = registry_with_pool("b", 4);
    registry.get_or_create_pool("a", PoolHooks::new(|| 0), PoolConfiguration::default());
    let id = registry.acquire("b").unwrap();
    registry.acquire("b").unwrap();
    registry.release(id, None).unwrap();

    let metrics = registry.metrics();
    assert_eq!(metrics.pool_count(), 2);
    assert_eq!(metrics.pools[0].pool, "a");
    assert_eq!(metrics.pools[1].outstanding, 1);
    assert_eq!(metrics.pools[1].idle, 1);
    assert_eq!(metrics.total_outstanding(), 1);
    assert_eq!(metrics.tracked_resources, 2);
}
