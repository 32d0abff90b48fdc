//! # EsoxSolutions.KeyedPool
//!
//! Keyed object pooling for Rust: a registry of named pools, each keeping a
//! bounded free list of idle resources that are handed out on demand and
//! taken back when no longer needed.
//!
//! ## Features
//!
//! - Pools created lazily by key, first registration wins
//! - LIFO reuse from a free list bounded by `max_size`
//! - Deterministic destruction of resources that overflow the free list
//! - Lifecycle hooks: factory, prepare-for-use, prepare-for-idle, destroy
//! - Per-resource records (key, state, taken count, timestamps)
//! - Release by identity, routed through the resource's record
//! - Maintenance sweeps for idle resources and empty pools
//! - Explicit shutdown that turns late calls into no-ops
//! - Metrics snapshots with Prometheus export
//!
//! The registry is single-threaded: drive it from one update loop.
//!
//! ## Quick Start
//!
//! ```rust
//! use esox_keyedpool::{PoolConfiguration, PoolHooks, PoolRegistry};
//!
//! let mut registry = PoolRegistry::new();
//! let config = PoolConfiguration::new().with_max_size(32);
//!
//! let mut pool = registry
//!     .get_or_create_pool("particles", PoolHooks::new(|| String::with_capacity(64)), config)
//!     .unwrap();
//! let particle = pool.acquire();
//! pool.get_mut(particle).unwrap().push_str("spark");
//!
//! registry.release(particle, None).unwrap();
//! registry.release_and_destroy_unused(None);
//! assert_eq!(registry.pool_count(), 0);
//! ```

mod arena;
mod config;
mod errors;
mod hooks;
mod metrics;
mod pool;
mod record;
mod registry;

pub use arena::ResourceId;
pub use config::{DEFAULT_MAX_SIZE, PoolConfiguration};
pub use errors::{DestroyFailure, NotFoundReason, PoolError, PoolResult};
pub use hooks::{PoolHooks, Transfer};
pub use metrics::{MetricsExporter, PoolMetrics, RegistryMetrics};
pub use pool::{ObjectPool, PoolMut, ReleaseOutcome};
pub use record::{PoolKey, ResourceRecord, ResourceState};
pub use registry::{KeepPredicate, PoolRegistry};
