//! Utility functions for local search operations.

/// A move must shorten the solution by more than this to be applied.
pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Node visited before position `pos`, with the depot before the first customer.
#[inline]
pub fn node_before(route: &[usize], pos: usize, depot: usize) -> usize {
    if pos == 0 {
        depot
    } else {
        route[pos - 1]
    }
}

/// Node visited after position `pos`, with the depot after the last customer.
#[inline]
pub fn node_after(route: &[usize], pos: usize, depot: usize) -> usize {
    route.get(pos + 1).copied().unwrap_or(depot)
}

/// Splice the segment `second[x2+1..=y2]` into `first` in place of
/// `first[x1+1..=y1]`, writing the result into `out`.
pub fn build_cross_route(
    first: &[usize],
    second: &[usize],
    x1: usize,
    y1: usize,
    x2: usize,
    y2: usize,
    out: &mut Vec<usize>,
) {
    out.clear();
    out.extend_from_slice(&first[..=x1]);
    out.extend_from_slice(&second[x2 + 1..=y2]);
    out.extend_from_slice(&first[y1 + 1..]);
}
