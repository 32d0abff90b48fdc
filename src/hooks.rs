//! Lifecycle hooks supplied by the host when a pool is created

use crate::errors::DestroyFailure;
use crate::record::PoolKey;

type Factory<T> = Box<dyn FnMut() -> T>;
type TransferHook<T> = Box<dyn FnMut(&mut T, &Transfer<'_>)>;
type DestroyHook<T> = Box<dyn FnMut(T) -> Result<(), DestroyFailure>>;

/// What the pool configuration asks the host to do while a resource moves
/// between the "in use" and "idle" contexts
#[derive(Debug, Clone, Copy)]
pub struct Transfer<'a> {
    pub key: &'a PoolKey,
    /// Move the resource into the pool's holding container (release) or the
    /// pool's in-use container (acquire)
    pub relocate: bool,
    /// Activate on acquire, deactivate on release
    pub activate: bool,
}

/// Factory plus prepare-for-use, prepare-for-idle and dispose hooks
///
/// # Examples
///
/// ```
/// use esox_keyedpool::{DestroyFailure, PoolHooks};
///
/// let hooks = PoolHooks::new(|| vec![0u8; 1024])
///     .on_release(|buf: &mut Vec<u8>, _| buf.fill(0))
///     .on_destroy(|buf| {
///         if buf.capacity() == 0 {
///             return Err(DestroyFailure::new("buffer already freed"));
///         }
///         Ok(())
///     });
/// # drop(hooks);
/// ```
pub struct PoolHooks<T> {
    factory: Factory<T>,
    on_acquire: Option<TransferHook<T>>,
    on_release: Option<TransferHook<T>>,
    on_destroy: Option<DestroyHook<T>>,
}

impl<T> PoolHooks<T> {
    /// Hooks with only a factory; disposal drops the value
    pub fn new<F>(factory: F) -> Self
    where
        F: FnMut() -> T + 'static,
    {
        Self {
            factory: Box::new(factory),
            on_acquire: None,
            on_release: None,
            on_destroy: None,
        }
    }

    pub fn on_acquire<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut T, &Transfer<'_>) + 'static,
    {
        self.on_acquire = Some(Box::new(hook));
        self
    }

    pub fn on_release<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut T, &Transfer<'_>) + 'static,
    {
        self.on_release = Some(Box::new(hook));
        self
    }

    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: FnMut(T) -> Result<(), DestroyFailure> + 'static,
    {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    pub(crate) fn create(&mut self) -> T {
        (self.factory)()
    }

    pub(crate) fn prepare_for_use(&mut self, value: &mut T, transfer: &Transfer<'_>) {
        if let Some(hook) = self.on_acquire.as_mut() {
            hook(value, transfer);
        }
    }

    pub(crate) fn prepare_for_idle(&mut self, value: &mut T, transfer: &Transfer<'_>) {
        if let Some(hook) = self.on_release.as_mut() {
            hook(value, transfer);
        }
    }

    pub(crate) fn destroy(&mut self, value: T) -> Result<(), DestroyFailure> {
        match self.on_destroy.as_mut() {
            Some(hook) => hook(value),
            None => {
                drop(value);
                Ok(())
            }
        }
    }
}
