//! Lifetime erasure for scoped jobs.
//!
//! This is the only module in the crate that uses `unsafe`.

#![allow(unsafe_code)]

use crate::queue::Job;

/// Extend a borrowed job to `'static` so it can sit in the shared ring.
///
/// # Safety
///
/// The caller must guarantee that the job has run (or been dropped) before
/// `'scope` ends. [`JobProducer::scope`](crate::JobProducer::scope)
/// upholds this by draining the queue before it returns, including when
/// the scope body unwinds.
pub(crate) unsafe fn erase_job<'scope>(job: Box<dyn FnOnce() + Send + 'scope>) -> Job {
    // SAFETY: only the trait-object lifetime bound changes; layout and
    // vtable are identical. The caller bounds the real lifetime.
    unsafe {
        std::mem::transmute::<Box<dyn FnOnce() + Send + 'scope>, Box<dyn FnOnce() + Send + 'static>>(
            job,
        )
    }
}
