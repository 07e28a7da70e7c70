//! Per-item batch execution for scenario sets and loan comparisons.
//!
//! Items never share state, so the `parallel` feature can hand them to
//! rayon's pool. Output order always matches input order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Apply `f` to every item, preserving input order.
#[cfg(feature = "parallel")]
pub fn map_items<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.par_iter().map(f).collect()
}

/// Apply `f` to every item, preserving input order.
#[cfg(not(feature = "parallel"))]
pub fn map_items<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.iter().map(f).collect()
}
