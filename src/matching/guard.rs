//! Non-blocking single-writer guard

use std::sync::{Mutex, MutexGuard, TryLockError};

/// A lock that is only ever tried, never waited on
///
/// Whoever fails to acquire it skips its work for this frame. A poisoned lock
/// is recovered: the pool contents are plain data and stay usable.
#[derive(Debug, Default)]
pub struct TryLock<T> {
    inner: Mutex<T>,
}

impl<T> TryLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Acquire the guard, or `None` if someone else holds it
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, T>> {
        match self.inner.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(poisoned)) => {
                tracing::warn!("Recovered poisoned matching guard");
                Some(poisoned.into_inner())
            }
        }
    }
}
