//! Error types for the keyed pool

use crate::record::PoolKey;
use thiserror::Error;

/// Why a release could not be routed to a pool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    #[error("resource record has no pool key bound")]
    UnboundRecord,

    #[error("no pool registered under key [{0}]")]
    UnknownPool(PoolKey),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Record already bound to [{bound}], refusing rebind to [{requested}]")]
    Configuration { bound: PoolKey, requested: PoolKey },

    #[error("Release target not found: {0}")]
    NotFound(NotFoundReason),

    #[error("Failed to destroy resource of pool [{pool}]: {reason}")]
    Destroy { pool: PoolKey, reason: DestroyFailure },
}

/// Failure reported by an `on_destroy` hook
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DestroyFailure(pub String);

impl DestroyFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
