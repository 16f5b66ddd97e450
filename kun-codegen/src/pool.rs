//! Bounded admission for worker threads.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

/// A counting semaphore: at most `size` permits are out at any time and
/// [`Pool::acquire`] blocks until one is returned.
#[derive(Debug)]
pub struct Pool {
    size: usize,
    in_use: Mutex<usize>,
    released: Condvar,
}

impl Pool {
    /// A pool of `size` permits; zero is treated as one.
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            in_use: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    /// Sized to the host's available parallelism.
    pub fn with_available_parallelism() -> Self {
        Self::new(
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        )
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Permits currently held.
    pub fn in_use(&self) -> usize {
        *self.lock()
    }

    /// Block until a permit is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut in_use = self.lock();
        while *in_use >= self.size {
            in_use = self
                .released
                .wait(in_use)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *in_use += 1;
        Permit { pool: self }
    }

    /// Block until every permit has been returned.
    pub fn wait_idle(&self) {
        let mut in_use = self.lock();
        while *in_use > 0 {
            in_use = self
                .released
                .wait(in_use)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    // the counter stays consistent even if a holder panicked
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_use.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        *self.lock() -= 1;
        self.released.notify_all();
    }
}

/// A held slot, returned to its [`Pool`] on drop.
#[derive(Debug)]
pub struct Permit<'a> {
    pool: &'a Pool,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.pool.release();
    }
}

/// Shared stop flag observed by workers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
