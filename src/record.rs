//! Per-resource bookkeeping

use crate::errors::{PoolError, PoolResult};
use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Immutable name of a pool
///
/// Cloning is cheap; every resource record bound to a pool shares the
/// pool's key allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey(Rc<str>);

impl PoolKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Rc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PoolKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PoolKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for PoolKey {
    fn from(key: String) -> Self {
        Self(Rc::from(key))
    }
}

/// Occupancy of a pooled resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceState {
    /// Sitting in a pool's free list
    #[default]
    Free,

    /// Handed out to a caller
    Taken,
}

/// Metadata tracked for every resource a pool hands out
///
/// # Examples
///
/// ```
/// use esox_keyedpool::{ResourceRecord, ResourceState};
///
/// let mut record = ResourceRecord::new();
/// assert!(record.setup("bullets").is_ok());
/// assert!(record.setup("bullets").is_ok());
/// assert!(record.setup("sparks").is_err());
/// assert_eq!(record.key().unwrap().as_str(), "bullets");
///
/// record.on_taken();
/// record.on_taken();
/// assert_eq!(record.state(), ResourceState::Taken);
/// assert_eq!(record.taken_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    key: Option<PoolKey>,
    state: ResourceState,
    taken_count: u64,
    created_at: Instant,
    last_taken_at: Option<Instant>,
    last_released_at: Option<Instant>,
}

impl ResourceRecord {
    pub fn new() -> Self {
        Self {
            key: None,
            state: ResourceState::Free,
            taken_count: 0,
            created_at: Instant::now(),
            last_taken_at: None,
            last_released_at: None,
        }
    }

    /// Record of a resource freshly constructed by the pool owning `key`
    pub(crate) fn for_pool(key: PoolKey) -> Self {
        Self {
            key: Some(key),
            ..Self::new()
        }
    }

    /// Bind the record to a pool key
    ///
    /// Binding the key that is already bound succeeds. A differing key is
    /// refused and the existing binding is kept.
    pub fn setup(&mut self, key: impl Into<PoolKey>) -> PoolResult<()> {
        let key = key.into();
        match &self.key {
            Some(bound) if *bound == key => Ok(()),
            Some(bound) => Err(PoolError::Configuration {
                bound: bound.clone(),
                requested: key,
            }),
            None => {
                self.key = Some(key);
                Ok(())
            }
        }
    }

    pub fn on_taken(&mut self) {
        if self.state == ResourceState::Free {
            self.state = ResourceState::Taken;
            self.taken_count += 1;
            self.last_taken_at = Some(Instant::now());
        }
    }

    pub fn on_released(&mut self) {
        if self.state == ResourceState::Taken {
            self.state = ResourceState::Free;
            self.last_released_at = Some(Instant::now());
        }
    }

    pub fn key(&self) -> Option<&PoolKey> {
        self.key.as_ref()
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn is_taken(&self) -> bool {
        self.state == ResourceState::Taken
    }

    /// Cumulative number of acquisitions
    pub fn taken_count(&self) -> u64 {
        self.taken_count
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_taken_at(&self) -> Option<Instant> {
        self.last_taken_at
    }

    pub fn last_released_at(&self) -> Option<Instant> {
        self.last_released_at
    }
}

impl Default for ResourceRecord {
    fn default() -> Self {
        Self::new()
    }
}
