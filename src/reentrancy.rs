//! Debug-only reentrancy check for `BucketTable`.
//!
//! Chain scans call user `PartialEq` impls for keys and values. If such an
//! impl reaches back into the same table while a scan or an unlink is in
//! progress, the table could observe itself half-updated. In debug builds the
//! check panics with the name of the operation that was interrupted; in
//! release builds it is a zero-sized no-op.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Single-threaded, like the table that embeds it.
    _not_send: PhantomData<*mut ()>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _not_send: PhantomData,
        }
    }

    /// Mark `op` as running until the returned scope drops.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> Scope<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(running) = self.active.get() {
                panic!("reentrant `{op}` on BucketTable while `{running}` is running");
            }
            self.active.set(Some(op));
            Scope { check: self }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            Scope { _check: PhantomData }
        }
    }
}

impl Default for ReentrancyCheck {
    fn default() -> Self {
        Self::new()
    }
}

// A copied table starts outside any critical section.
impl Clone for ReentrancyCheck {
    fn clone(&self) -> Self {
        Self::new()
    }
}

pub(crate) struct Scope<'a> {
    #[cfg(debug_assertions)]
    check: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _check: PhantomData<&'a ()>,
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.check.active.set(None);
    }
}
