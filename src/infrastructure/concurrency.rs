/// Thread pool setup for batch decoding.

use anyhow::{Context, Result};

/// Default worker count: half the cores, at least one.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Initialize the global rayon thread pool. `workers` overrides the default.
/// Returns the number of workers in use.
pub fn init_thread_pool(workers: Option<usize>) -> Result<usize> {
    let workers = workers.filter(|&n| n > 0).unwrap_or_else(default_workers);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .context("Failed to initialize the global thread pool")?;

    tracing::debug!(workers, cores = num_cpus::get(), "initialized thread pool");
    Ok(workers)
}
