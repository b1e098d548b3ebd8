//! Parallel processing utilities for the per-facet passes
//!
//! Configuration is passed explicitly to every call; nothing is kept in
//! process-wide state. Without a thread count the work runs on rayon's
//! global pool, with one a pool is built for the duration of the call.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Thread configuration for the parallel passes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of threads to use (None = rayon's global pool)
    pub num_threads: Option<usize>,
    /// Enable parallel processing (can be disabled for debugging)
    pub enabled: bool,
    /// Inputs shorter than this are processed sequentially
    pub min_parallel_len: usize,
    /// Thread name prefix for call-local pools
    pub thread_name_prefix: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            enabled: true,
            min_parallel_len: 1024,
            thread_name_prefix: "meshgen-worker".to_string(),
        }
    }
}

impl ParallelConfig {
    /// Run everything on the calling thread
    pub fn sequential() -> Self {
        Self::default().with_enabled(false)
    }

    /// Set number of threads
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Enable or disable parallel processing
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the length below which work stays sequential
    pub fn with_min_parallel_len(mut self, min_parallel_len: usize) -> Self {
        self.min_parallel_len = min_parallel_len;
        self
    }

    fn parallel_for(&self, len: usize) -> bool {
        self.enabled && len >= self.min_parallel_len
    }
}

/// Execute `op` on the configured pool
pub fn execute_parallel<F, R>(config: &ParallelConfig, op: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    let Some(num_threads) = config.num_threads else {
        return op();
    };

    let prefix = config.thread_name_prefix.clone();
    match ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(move |index| format!("{}-{}", prefix, index))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!("failed to build a {}-thread pool ({}), using the global pool", num_threads, e);
            op()
        }
    }
}

/// Parallel map-reduce.
///
/// `reduce_op` must be associative and `identity` neutral for it; the
/// result then only depends on the worker count through rounding.
pub fn parallel_reduce<T, U, F, R>(
    config: &ParallelConfig,
    data: &[T],
    identity: U,
    map_op: F,
    reduce_op: R,
) -> U
where
    T: Sync,
    U: Clone + Send + Sync,
    F: Fn(&T) -> U + Sync + Send,
    R: Fn(U, U) -> U + Sync + Send,
{
    if !config.parallel_for(data.len()) {
        return data.iter().map(map_op).fold(identity, reduce_op);
    }

    execute_parallel(config, || {
        data.par_iter()
            .map(map_op)
            .reduce(|| identity.clone(), reduce_op)
    })
}

/// Apply `op` to every element independently
pub fn parallel_for_each_mut<T, F>(config: &ParallelConfig, data: &mut [T], op: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    if !config.parallel_for(data.len()) {
        data.iter_mut().for_each(op);
        return;
    }

    execute_parallel(config, || data.par_iter_mut().for_each(op));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_config() {
        let config = ParallelConfig::default()
            .with_threads(4)
            .with_min_parallel_len(10)
            .with_enabled(true);

        assert_eq!(config.num_threads, Some(4));
        assert_eq!(config.min_parallel_len, 10);
        assert!(config.enabled);
        assert!(!ParallelConfig::sequential().enabled);
    }

    #[test]
    fn test_parallel_reduce() {
        let data: Vec<u64> = (1..=5000).collect();
        let config = ParallelConfig::default().with_min_parallel_len(1);
        let sum = parallel_reduce(&config, &data, 0, |x| *x, |a, b| a + b);
        assert_eq!(sum, 5000 * 5001 / 2);

        let sum = parallel_reduce(&ParallelConfig::sequential(), &data, 0, |x| *x, |a, b| a + b);
        assert_eq!(sum, 5000 * 5001 / 2);
    }

    #[test]
    fn test_parallel_reduce_with_local_pool() {
        let data: Vec<u64> = (0..100).collect();
        let config = ParallelConfig::default()
            .with_threads(2)
            .with_min_parallel_len(1);
        let max = parallel_reduce(&config, &data, 0, |x| *x, |a, b| a.max(b));
        assert_eq!(max, 99);
    }

    #[test]
    fn test_parallel_for_each_mut() {
        let mut data: Vec<i32> = (0..3000).collect();
        let config = ParallelConfig::default().with_min_parallel_len(1);
        parallel_for_each_mut(&config, &mut data, |x| *x *= 2);
        assert!(data.iter().enumerate().all(|(i, x)| *x == 2 * i as i32));
    }

    #[test]
    fn test_empty_input() {
        let data: Vec<f64> = Vec::new();
        let config = ParallelConfig::default().with_min_parallel_len(0);
        assert_eq!(parallel_reduce(&config, &data, 0.0, |x| *x, |a, b| a + b), 0.0);
    }
}
