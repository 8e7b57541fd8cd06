use anyhow::Context;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared by every unit of one run.
///
/// Checked before a unit starts and after it finishes; running processes are left to exit on
/// their own.
#[derive(Clone, Debug, Default)]
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

/// Bounded pool for independent units (checks, build pairs).
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    jobs: usize,
}

impl WorkerPool {
    /// `None` sizes the pool by the available parallelism.
    pub fn new(jobs: Option<usize>) -> anyhow::Result<Self> {
        let jobs = jobs
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("buildgate-worker-{i}"))
            .build()
            .context("build worker pool")?;
        tracing::debug!(jobs, "worker pool ready");
        Ok(Self { pool, jobs })
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run `work` over `items` concurrently and return results in input order.
    ///
    /// A unit observed as cancelled before it starts, or once it has finished, yields
    /// `on_cancel(item)` instead of its result.
    pub fn run_units<T, R, W, C>(
        &self,
        items: &[T],
        cancel: &CancelToken,
        work: W,
        on_cancel: C,
    ) -> Vec<R>
    where
        T: Sync,
        R: Send,
        W: Fn(&T) -> R + Sync + Send,
        C: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    if cancel.is_cancelled() {
                        return on_cancel(item);
                    }
                    let result = work(item);
                    if cancel.is_cancelled() {
                        return on_cancel(item);
                    }
                    result
                })
                .collect()
        })
    }
}
