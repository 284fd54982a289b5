//! Reusable fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use hearth_arena::Arena;

/// Fill byte used by [`dirty_block`], so tests can tell zeroed memory
/// from untouched memory.
pub const DIRTY_BYTE: u8 = 0xAB;

/// A zero-filled block of `size` bytes.
pub fn zeroed_block(size: usize) -> Vec<u8> {
    vec![0; size]
}

/// A block of `size` bytes filled with [`DIRTY_BYTE`].
pub fn dirty_block(size: usize) -> Vec<u8> {
    vec![DIRTY_BYTE; size]
}

/// Run `f` against a fresh arena over a zeroed block of `size` bytes.
pub fn with_arena<R>(size: usize, f: impl FnOnce(&mut Arena<'_>) -> R) -> R {
    let mut block = zeroed_block(size);
    let mut arena = Arena::new(&mut block);
    f(&mut arena)
}

/// Shared counter handing out `'static` jobs that increment it.
#[derive(Clone, Debug, Default)]
pub struct JobCounter {
    count: Arc<AtomicUsize>,
}

impl JobCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A job that adds one to the counter.
    pub fn job(&self) -> impl FnOnce() + Send + 'static {
        self.job_adding(1)
    }

    /// A job that adds `n` to the counter.
    pub fn job_adding(&self, n: usize) -> impl FnOnce() + Send + 'static {
        let count = Arc::clone(&self.count);
        move || {
            count.fetch_add(n, Ordering::SeqCst);
        }
    }

    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Records values pushed from jobs, in completion order.
#[derive(Debug)]
pub struct Recorder<T> {
    seen: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            seen: Arc::clone(&self.seen),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A job that records `value`.
    pub fn job(&self, value: T) -> impl FnOnce() + Send + 'static {
        let seen = Arc::clone(&self.seen);
        move || {
            seen.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(value);
        }
    }

    /// Everything recorded so far.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.seen.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A job that sleeps for `millis` and then bumps `counter`.
pub fn sleep_job(counter: &JobCounter, millis: u64) -> impl FnOnce() + Send + 'static {
    let bump = counter.job();
    move || {
        std::thread::sleep(Duration::from_millis(millis));
        bump();
    }
}
