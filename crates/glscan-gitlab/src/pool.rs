//! Fixed-width worker pool over a [`JoinSet`].
//!
//! At most `width` tasks exist at any time: jobs are pulled lazily from an
//! iterator and a new one is spawned only after a running one completes.
//! Results come back in completion order. Dropping the pool aborts whatever
//! is still running.

use std::future::Future;

use tokio::task::{JoinError, JoinSet};

pub(crate) struct BoundedPool<T> {
    tasks: JoinSet<T>,
    width: usize,
}

impl<T: Send + 'static> BoundedPool<T> {
    /// A width of zero is treated as one.
    pub(crate) fn new(width: usize) -> Self {
        Self {
            tasks: JoinSet::new(),
            width: width.max(1),
        }
    }

    /// Spawn jobs until the pool is full or `jobs` runs dry.
    pub(crate) fn refill<I, F>(&mut self, jobs: &mut I)
    where
        I: Iterator<Item = F>,
        F: Future<Output = T> + Send + 'static,
    {
        while self.tasks.len() < self.width {
            let Some(job) = jobs.next() else {
                break;
            };
            self.tasks.spawn(job);
        }
    }

    /// Wait for the next task to finish. `None` once the pool is empty.
    pub(crate) async fn join_next(&mut self) -> Option<Result<T, JoinError>> {
        self.tasks.join_next().await
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_runs_more_than_width() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut jobs = (0..40u64).map(|i| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2 + i % 5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                i
            }
        });

        let mut pool = BoundedPool::new(3);
        pool.refill(&mut jobs);
        assert_eq!(pool.in_flight(), 3);

        let mut done = Vec::new();
        while let Some(joined) = pool.join_next().await {
            done.push(joined.unwrap());
            pool.refill(&mut jobs);
        }

        done.sort_unstable();
        assert_eq!(done, (0..40).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn zero_width_still_makes_progress() {
        let mut jobs = (0..3u8).map(|i| async move { i });
        let mut pool = BoundedPool::new(0);
        pool.refill(&mut jobs);
        let mut count = 0;
        while let Some(joined) = pool.join_next().await {
            joined.unwrap();
            count += 1;
            pool.refill(&mut jobs);
        }
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn empty_job_list_finishes_immediately() {
        let mut jobs = std::iter::empty::<std::future::Ready<()>>();
        let mut pool = BoundedPool::new(4);
        pool.refill(&mut jobs);
        assert!(pool.join_next().await.is_none());
    }
}
