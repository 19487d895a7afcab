use rayon::prelude::*;

/// Number of pixels from which [`ExecutionStrategy::Auto`] switches to the rayon pool.
pub const AUTO_PARALLEL_MIN_PIXELS: usize = 100_000;

/// Controls how the rows of a single filter call are executed.
///
/// Every strategy produces the same output; only the scheduling differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the caller already runs
    /// many filters concurrently.
    Serial,

    /// Use the global rayon thread pool to process rows in parallel.
    ParallelRows,

    /// Parallel for images of at least [`AUTO_PARALLEL_MIN_PIXELS`] pixels, serial otherwise.
    #[default]
    Auto,
}

impl ExecutionStrategy {
    /// Whether an image with `num_pixels` pixels is processed on the rayon pool.
    pub fn is_parallel(&self, num_pixels: usize) -> bool {
        match self {
            ExecutionStrategy::Serial => false,
            ExecutionStrategy::ParallelRows => true,
            ExecutionStrategy::Auto => num_pixels >= AUTO_PARALLEL_MIN_PIXELS,
        }
    }
}

/// Apply a function to each row of a destination buffer.
///
/// # Arguments
///
/// * `dst` - The destination buffer, split into rows of `row_len` elements.
/// * `row_len` - Number of elements per row (width * channels).
/// * `strategy` - The execution strategy.
/// * `f` - Called with the row index and the mutable row slice.
pub(crate) fn for_each_row<T: Send>(
    dst: &mut [T],
    row_len: usize,
    strategy: ExecutionStrategy,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) {
    if row_len == 0 {
        return;
    }

    let num_rows = dst.len() / row_len;
    let num_pixels = num_rows * row_len;

    if strategy.is_parallel(num_pixels) {
        dst.par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    } else {
        dst.chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(r, row)| f(r, row));
    }
}
