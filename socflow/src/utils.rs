//! Utilities.

/// Returns floor log2. `flog2(0)` is 0.
pub const fn flog2(val: usize) -> usize {
    if val <= 1 {
        0
    } else {
        1 + flog2(val >> 1)
    }
}

/// Returns whether `value` is a power of two.
pub const fn is_pow2(value: usize) -> bool { value != 0 && value & (value - 1) == 0 }

/// Return aligned value of `value` by `by`
///
/// ### Example
/// ```
/// let value = 15;
/// let byte_aligned = socflow::align_up(value, 8);
/// assert_eq!(byte_aligned, 16);
/// ```
pub const fn align_up(value: u64, by: u64) -> u64 { (value + by - 1) / by * by }

/// Combines all elements into one String, separated by `sep`. Returns `None` if all elements are `None`.
pub fn join_options<I>(sep: &str, iterable: I) -> Option<String>
where I: IntoIterator<Item = Option<String>> {
    let iterable = iterable.into_iter().flatten().collect::<Vec<_>>();
    if iterable.is_empty() {
        None
    } else {
        Some(iterable.join(sep))
    }
}
