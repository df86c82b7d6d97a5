// src/checker/pool.rs
// =============================================================================
// A small worker pool for link probes.
//
// Three separate concerns, three separate tools:
// - HOW MANY run at once  -> a Semaphore with a fixed number of permits
// - ARE THEY ALL DONE?    -> a TaskTracker that every job registers with
// - STOP EVERYTHING       -> a shared ProbeContext (cancellation token plus
//                            an absolute deadline)
//
// Jobs are registered with the tracker at submit() time, synchronously, so a
// caller that starts waiting right after submitting can never miss a job.
// A job first waits for a permit, then runs; the permit is released when the
// job ends no matter how it ends (finished, failed, or cancelled), because
// dropping the permit is what releases it.
//
// Rust concepts:
// - tokio::select!: race several futures, run the branch that finishes first
// - Arc<Semaphore>: shared, owned permits that can move into spawned tasks
// - Drop: cancelling the pool when its owner goes away
// =============================================================================

use std::future::Future;
use std::sync::Arc;

use log::debug;
use tokio::sync::Semaphore;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Shared cancellation for every probe of one inspection
///
/// Cancelled either explicitly or automatically once `deadline` passes.
#[derive(Debug, Clone)]
pub struct ProbeContext {
    token: CancellationToken,
    deadline: Instant,
}

impl ProbeContext {
    // Creates a context that cancels itself at `deadline`
    //
    // Must be called inside a tokio runtime: a small watchdog task fires the
    // cancellation when the deadline passes.
    pub fn with_deadline(deadline: Instant) -> Self {
        let token = CancellationToken::new();
        let watchdog = token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = sleep_until(deadline) => {
                    debug!("probe deadline reached, cancelling remaining probes");
                    watchdog.cancel();
                }
                _ = watchdog.cancelled() => {}
            }
        });

        ProbeContext { token, deadline }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Why a wait on the pool returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every submitted job has finished
    Drained,
    /// The shared deadline passed; remaining jobs were cancelled
    DeadlineElapsed,
    /// The caller's own (earlier) deadline passed; jobs keep running
    CallerDeadline,
}

/// Bounded-concurrency pool: submit jobs, then wait for them to drain
#[derive(Debug)]
pub struct ProbePool {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    context: ProbeContext,
}

impl ProbePool {
    // `capacity` = maximum number of jobs running at the same time
    pub fn new(capacity: usize, context: ProbeContext) -> Self {
        ProbePool {
            permits: Arc::new(Semaphore::new(capacity.max(1))),
            tracker: TaskTracker::new(),
            context,
        }
    }

    pub fn context(&self) -> &ProbeContext {
        &self.context
    }

    // Spawns a job that runs once a permit is free
    //
    // If the context is cancelled while the job is queued it never starts;
    // if it is cancelled while the job runs, the job future is dropped
    // (which aborts any request it had in flight).
    pub fn submit<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let context = self.context.clone();

        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = context.cancelled() => {}
                permit = permits.acquire_owned() => {
                    // acquire only fails if the semaphore was closed
                    let Ok(_permit) = permit else { return };

                    tokio::select! {
                        biased;
                        _ = context.cancelled() => {}
                        _ = job => {}
                    }
                }
            }
        });
    }

    // No more jobs will be submitted; required before wait() can report Drained
    pub fn close(&self) {
        self.tracker.close();
    }

    /// Number of jobs queued or running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    // Waits until every job is done or the shared deadline passes
    pub async fn wait(&self) -> WaitOutcome {
        self.wait_until(self.context.deadline()).await
    }

    // Like wait(), but also gives up at the caller's own deadline
    //
    // Reaching the shared deadline cancels the remaining jobs; reaching only
    // the caller's earlier deadline leaves them running.
    pub async fn wait_until(&self, deadline: Instant) -> WaitOutcome {
        let shared_deadline = self.context.deadline();
        let stop_at = deadline.min(shared_deadline);

        tokio::select! {
            biased;
            _ = self.tracker.wait() => {
                // jobs cut short by the watchdog can drain in the same tick
                if self.context.is_cancelled() && Instant::now() >= shared_deadline {
                    WaitOutcome::DeadlineElapsed
                } else {
                    WaitOutcome::Drained
                }
            }
            _ = sleep_until(stop_at) => {
                if stop_at < shared_deadline {
                    WaitOutcome::CallerDeadline
                } else {
                    self.context.cancel();
                    WaitOutcome::DeadlineElapsed
                }
            }
        }
    }

    pub fn cancel(&self) {
        self.context.cancel();
    }
}

impl Drop for ProbePool {
    fn drop(&mut self) {
        self.context.cancel();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Semaphore instead of buffer_unordered(N)?
//    - buffer_unordered only makes progress while someone polls the stream
//    - Our probes must keep running while the caller does other things
//      (printing progress, taking snapshots), so each job is its own task
//    - The semaphore caps how many of those tasks do real work at once
//
// 2. What does "biased;" do in select!?
//    - Normally select! picks a random ready branch
//    - biased checks the branches top to bottom, so cancellation always
//      wins over starting a job
//
// 3. Why is dropping a future enough to cancel a request?
//    - A Rust future does nothing unless polled
//    - When select! drops the losing branch, the reqwest future inside it
//      is dropped too, and that closes its connection
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    fn pool(capacity: usize, deadline_in: Duration) -> ProbePool {
        ProbePool::new(capacity, ProbeContext::with_deadline(Instant::now() + deadline_in))
    }

    #[tokio::test]
    async fn test_never_exceeds_capacity() {
        let pool = pool(2, Duration::from_secs(10));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let finished = Arc::clone(&finished);

            pool.submit(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.close();

        assert_eq!(pool.wait().await, WaitOutcome::Drained);
        assert_eq!(finished.load(Ordering::SeqCst), 10);
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_empty_pool_drains_immediately() {
        let pool = pool(4, Duration::from_secs(10));
        pool.close();
        assert_eq!(pool.wait().await, WaitOutcome::Drained);
    }

    #[tokio::test]
    async fn test_shared_deadline_cancels_jobs() {
        let pool = pool(1, Duration::from_millis(50));
        let finished = Arc::new(AtomicBool::new(false));

        for _ in 0..3 {
            let finished = Arc::clone(&finished);
            pool.submit(async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                finished.store(true, Ordering::SeqCst);
            });
        }
        pool.close();

        assert_eq!(pool.wait().await, WaitOutcome::DeadlineElapsed);
        assert!(pool.context().is_cancelled());
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_stops_running_and_queued_jobs() {
        let pool = pool(1, Duration::from_secs(30));
        let started = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let started = Arc::clone(&started);
            pool.submit(async move {
                started.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
        pool.close();

        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.cancel();

        let outcome = pool.wait_until(Instant::now() + Duration::from_secs(5)).await;
        assert_eq!(outcome, WaitOutcome::Drained);
        // only the job holding the single permit ever started
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_caller_deadline_leaves_jobs_running() {
        let pool = pool(1, Duration::from_secs(30));
        pool.submit(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        pool.close();

        let outcome = pool.wait_until(Instant::now() + Duration::from_millis(30)).await;
        assert_eq!(outcome, WaitOutcome::CallerDeadline);
        assert!(!pool.context().is_cancelled());
        assert_eq!(pool.in_flight(), 1);
    }
}
