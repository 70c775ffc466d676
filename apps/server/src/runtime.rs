use std::io;
use std::num::NonZero;
use std::thread::available_parallelism;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 1024;
/// 3 `MiB`
const STACK_SIZE: usize = 3 * 1024 * 1024;
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const THREAD_NAME: &str = "imghub-worker";

/// Worker count to use: the configured value, or one per available core.
#[must_use]
pub fn worker_threads(configured: Option<usize>) -> usize {
    configured
        .filter(|&n| n > 0)
        .unwrap_or_else(|| available_parallelism().map_or(DEFAULT_WORKER_THREADS, NonZero::get))
        .min(MAX_WORKER_THREADS)
}

/// Builds the multi-threaded server runtime.
///
/// # Errors
/// Returns the I/O error reported by Tokio if the runtime cannot start.
pub fn build(configured: Option<usize>) -> io::Result<Runtime> {
    let workers = worker_threads(configured);

    Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_stack_size(STACK_SIZE)
        .thread_name(THREAD_NAME)
        .thread_keep_alive(THREAD_KEEP_ALIVE)
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_threads_prefers_configuration() {
        assert_eq!(worker_threads(Some(3)), 3);
        assert_eq!(worker_threads(Some(100_000)), MAX_WORKER_THREADS);
        assert!(worker_threads(Some(0)) >= 1);
        assert!(worker_threads(None) >= 1);
    }

    #[test]
    fn test_runtime_runs_futures() {
        let runtime = build(Some(2)).unwrap();
        assert_eq!(runtime.block_on(async { 40 + 2 }), 42);
    }
}
