use std::sync::Arc;

use log::error;
use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::common::future_result::FutureResult;

static SHARED_FETCH_EXECUTOR: OnceCell<Arc<Executor>> = OnceCell::new();

/// Executor used to fan out segment fetches.
///
/// `SingleThread` runs every task inline on the caller's thread, `ThreadPool`
/// hands each task to a rayon pool.
pub enum Executor {
    /// Single thread variant of an Executor
    SingleThread,
    /// Thread pool variant of an Executor
    ThreadPool(ThreadPool),
}

impl Executor {
    /// Creates an Executor that performs all task in the caller thread.
    pub fn single_thread() -> Executor {
        Executor::SingleThread
    }

    /// Creates an Executor that dispatches the tasks in a thread pool.
    pub fn multi_thread(num_threads: usize, prefix: &'static str) -> crate::Result<Executor> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(move |num| format!("{prefix}{num}"))
            .build()?;
        Ok(Executor::ThreadPool(pool))
    }

    pub fn is_single_thread(&self) -> bool {
        matches!(self, Executor::SingleThread)
    }

    /// Schedules `task` and returns a handle on its result.
    ///
    /// With a single thread executor the task has already completed when
    /// this returns.
    pub fn spawn<T, F>(&self, task: F) -> FutureResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> crate::Result<T> + Send + 'static,
    {
        match self {
            Executor::SingleThread => FutureResult::ready(task()),
            Executor::ThreadPool(pool) => {
                let (future_result, sender) = FutureResult::create("Fetch task failed.");
                pool.spawn(move || {
                    if sender.send(task()).is_err() {
                        error!("Failed to send fetch result, the lookup was probably abandoned.");
                    }
                });
                future_result
            }
        }
    }
}

/// Returns the process-wide fetch pool, building it on first use.
pub fn shared_multi_thread_executor(num_threads: usize) -> crate::Result<Arc<Executor>> {
    SHARED_FETCH_EXECUTOR
        .get_or_try_init(|| Executor::multi_thread(num_threads, "posting-fetch-").map(Arc::new))
        .cloned()
}
