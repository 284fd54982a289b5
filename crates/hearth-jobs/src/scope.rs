//! Scoped jobs that may borrow from the producer's stack.

use std::marker::PhantomData;

use crate::erase::erase_job;
use crate::error::QueueError;
use crate::producer::{DrainReport, JobProducer};
use crate::queue::Enqueued;

/// Handle passed to the closure of [`JobProducer::scope`].
///
/// Jobs enqueued here may capture references with lifetime `'scope`,
/// typically slices resolved from a scoped arena region. The enclosing
/// `scope` call drains the queue before returning, which is what makes
/// the borrows sound.
///
/// `'scope` and `'env` are invariant, mirroring [`std::thread::Scope`].
pub struct JobScope<'scope, 'env: 'scope> {
    producer: &'scope JobProducer,
    scope: PhantomData<&'scope mut &'scope ()>,
    env: PhantomData<&'env mut &'env ()>,
}

impl<'scope, 'env> JobScope<'scope, 'env> {
    pub(crate) fn new(producer: &'scope JobProducer) -> Self {
        Self {
            producer,
            scope: PhantomData,
            env: PhantomData,
        }
    }

    /// Enqueue a job that may borrow data living at least as long as the
    /// scope.
    pub fn enqueue<F>(&'scope self, job: F) -> Result<Enqueued, QueueError>
    where
        F: FnOnce() + Send + 'scope,
    {
        let job: Box<dyn FnOnce() + Send + 'scope> = Box::new(job);
        // SAFETY: `JobProducer::scope` drains the queue before `'scope`
        // ends, on both the normal and the unwinding path.
        #[allow(unsafe_code)]
        let job = unsafe { erase_job(job) };
        self.producer.work_queue().push(job)
    }

    /// Drain mid-scope, e.g. between two dependent batches of jobs.
    pub fn drain(&self) -> Result<DrainReport, QueueError> {
        self.producer.drain()
    }
}

impl std::fmt::Debug for JobScope<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScope").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{JobProducer, QueueConfig};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn mid_scope_drain_orders_batches() {
        let p = JobProducer::new(&QueueConfig::with_capacity(8)).unwrap();
        let mut data = [1u32; 8];
        let total = AtomicUsize::new(0);
        p.scope(|s| {
            let (left, right) = data.split_at_mut(4);
            s.enqueue(move || left.iter_mut().for_each(|x| *x += 1))
                .unwrap();
            s.enqueue(move || right.iter_mut().for_each(|x| *x += 2))
                .unwrap();
            s.drain().unwrap();
            s.enqueue(|| {
                total.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        })
        .unwrap();
        assert_eq!(data, [2, 2, 2, 2, 3, 3, 3, 3]);
        assert_eq!(total.load(Ordering::Relaxed), 1);
    }
}
