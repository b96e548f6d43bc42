#![forbid(unsafe_code)]

//! Shared handle to the host-owned target.
//!
//! The history engine never owns the target. The host creates a
//! [`TargetHandle`], keeps one clone for itself (to render, inspect or reset
//! the target) and gives another to [`History::new`](crate::History::new).

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable, shared handle to a mutable target.
pub struct TargetHandle<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for TargetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for TargetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TargetHandle").field(&*self.lock()).finish()
    }
}

impl<T: Default> Default for TargetHandle<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<Arc<Mutex<T>>> for TargetHandle<T> {
    fn from(inner: Arc<Mutex<T>>) -> Self {
        Self { inner }
    }
}

impl<T> TargetHandle<T> {
    /// Wrap a target value in a new shared handle.
    #[must_use]
    pub fn new(target: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(target)),
        }
    }

    /// Lock the target.
    ///
    /// A poisoned lock is recovered: the engine keeps no state behind it, so
    /// the target is handed out as the panicking holder left it.
    pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Read the target through a closure.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.lock())
    }

    /// Mutate the target out-of-band.
    ///
    /// Edits made here bypass the history; operations whose spans they touch
    /// will later fail with `Inapplicable`.
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut *self.lock())
    }

    /// Replace the target value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.lock(), value)
    }

    /// Clone the current target value.
    #[must_use]
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.lock().clone()
    }

    /// Check whether two handles point at the same target.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
