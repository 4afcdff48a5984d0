//! Per-thread microtask queues
//!
//! Every thread owns one [`JobQueue`]. A promise remembers the queue of the
//! thread that created it and hands its reactions to that queue, so jobs are
//! never run inside the call that enqueues them. A queue is drained when a
//! promise belonging to it is polled, or explicitly through
//! [`run_microtasks`]. At most one thread drains a given queue at a time.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Waker;

pub(crate) type Job = Box<dyn FnOnce() + Send>;

thread_local! {
    static CURRENT: Arc<JobQueue> = Arc::new(JobQueue::new());
}

/// Run every job queued on the current thread, including jobs those jobs
/// enqueue, until the queue is empty
///
/// Futures returned by [`Promise::settled`](crate::Promise::settled) and
/// `IntoFuture` drain automatically when polled. This is the hook for
/// synchronous callers that drive promises without an executor.
pub fn run_microtasks() {
    JobQueue::current().drain();
}

pub(crate) struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    draining: AtomicBool,
    wakers: Mutex<Vec<Waker>>,
}

impl JobQueue {
    fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
            wakers: Mutex::new(Vec::new()),
        }
    }

    /// Queue of the calling thread
    pub(crate) fn current() -> Arc<Self> {
        CURRENT.with(Arc::clone)
    }

    pub(crate) fn push(&self, job: Job) {
        self.jobs.lock().push_back(job);

        let wakers = std::mem::take(&mut *self.wakers.lock());
        for waker in wakers {
            waker.wake();
        }
    }

    /// Wake `waker` on the next push
    pub(crate) fn register(&self, waker: &Waker) {
        let mut wakers = self.wakers.lock();
        if !wakers.iter().any(|known| known.will_wake(waker)) {
            wakers.push(waker.clone());
        }
    }

    pub(crate) fn drain(&self) {
        loop {
            if self.draining.swap(true, Ordering::Acquire) {
                return;
            }

            let mut ran = 0_usize;
            while let Some(job) = self.pop() {
                ran += 1;
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::error!("microtask panicked");
                }
            }
            if ran > 0 {
                tracing::trace!(jobs = ran, "drained microtasks");
            }
            self.draining.store(false, Ordering::Release);

            // A push that raced the release above would otherwise wait for
            // the next poll
            if self.jobs.lock().is_empty() {
                return;
            }
        }
    }

    // Lock released before the job runs; jobs enqueue more jobs
    fn pop(&self) -> Option<Job> {
        self.jobs.lock().pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn log_job(log: &Arc<Mutex<Vec<u32>>>, entry: u32) -> Job {
        let log = Arc::clone(log);
        Box::new(move || log.lock().push(entry))
    }

    #[test]
    fn push_does_not_run_job() {
        let queue = JobQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        queue.push(log_job(&log, 1));
        assert!(log.lock().is_empty());

        queue.drain();
        assert_eq!(*log.lock(), vec![1]);
    }

    #[test]
    fn drain_runs_jobs_enqueued_by_jobs_in_order() {
        let queue = Arc::new(JobQueue::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner = Arc::clone(&queue);
        let nested = log_job(&log, 3);
        queue.push(log_job(&log, 1));
        queue.push(Box::new(move || inner.push(nested)));
        queue.push(log_job(&log, 2));

        queue.drain();
        assert_eq!(*log.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn panicking_job_does_not_stall_queue() {
        let queue = JobQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        queue.push(log_job(&log, 1));
        queue.push(Box::new(|| panic!("job failed")));
        queue.push(log_job(&log, 2));
        queue.drain();

        queue.push(log_job(&log, 3));
        queue.drain();
        assert_eq!(*log.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn run_microtasks_drains_current_thread() {
        let log = Arc::new(Mutex::new(Vec::new()));
        JobQueue::current().push(log_job(&log, 7));

        run_microtasks();
        assert_eq!(*log.lock(), vec![7]);
    }
}
