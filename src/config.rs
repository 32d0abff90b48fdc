//! Pool configuration options

use std::fmt;

pub const DEFAULT_MAX_SIZE: usize = 100;

/// Configuration for a keyed pool
///
/// # Examples
///
/// ```
/// use esox_keyedpool::PoolConfiguration;
///
/// let config = PoolConfiguration::new()
///     .with_max_size(16)
///     .with_relocate_on_transfer(false);
///
/// assert_eq!(config.max_size, 16);
/// assert!(!config.relocate_on_transfer);
/// assert!(config.activate_on_acquire);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfiguration {
    /// Maximum number of idle resources kept in the free list
    pub max_size: usize,

    /// Whether acquire/release move the resource between host containers
    pub relocate_on_transfer: bool,

    /// Whether acquire forces the resource active (and release inactive)
    pub activate_on_acquire: bool,

    /// Whether the resource record is updated on acquire/release
    pub update_record_on_transfer: bool,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            relocate_on_transfer: true,
            activate_on_acquire: true,
            update_record_on_transfer: true,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the free-list capacity
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    pub fn with_relocate_on_transfer(mut self, relocate: bool) -> Self {
        self.relocate_on_transfer = relocate;
        self
    }

    pub fn with_activate_on_acquire(mut self, activate: bool) -> Self {
        self.activate_on_acquire = activate;
        self
    }

    pub fn with_update_record_on_transfer(mut self, update: bool) -> Self {
        self.update_record_on_transfer = update;
        self
    }
}

impl fmt::Display for PoolConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ max_size = {}, relocate_on_transfer = {}, activate_on_acquire = {}, update_record_on_transfer = {} }}",
            self.max_size,
            self.relocate_on_transfer,
            self.activate_on_acquire,
            self.update_record_on_transfer,
        )
    }
}
