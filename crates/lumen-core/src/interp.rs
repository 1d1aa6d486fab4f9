//! Piecewise-linear interpolation over tabulated data.
//!
//! Photometric webs and tilt tables are sampled at discrete angles. Between
//! knots the value is interpolated linearly; outside the tabulated range the
//! table evaluates to zero rather than extrapolating.

use ndarray::ArrayView1;

/// Evaluate the piecewise-linear function through `(xs[i], ys[i])` at `x`.
///
/// `xs` must be strictly increasing and `ys` at least as long as `xs`.
/// Returns `0.0` for `x` outside `[xs[0], xs[n-1]]`, for an empty table, and
/// for NaN queries.
pub fn interp_or_zero(x: f64, xs: &[f64], ys: ArrayView1<'_, f64>) -> f64 {
    let n = xs.len();
    if n == 0 || !(x >= xs[0] && x <= xs[n - 1]) {
        return 0.0;
    }
    if n == 1 {
        return ys[0];
    }

    // Binary search for the enclosing interval
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] > x {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    // Weighted form keeps the knot values exact at t = 0 and t = 1.
    let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
    (1.0 - t) * ys[lo] + t * ys[hi]
}

/// Check that `xs` is strictly increasing.
///
/// Returns the index of the first offending element, if any.
pub fn first_unsorted(xs: &[f64]) -> Option<usize> {
    (1..xs.len()).find(|&i| !(xs[i] > xs[i - 1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_interp_passes_through_knots() {
        let xs = [0.0, 0.5, 1.3, 2.0];
        let ys = arr1(&[2.0, 3.0, 5.0, 4.0]);
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_eq!(interp_or_zero(*x, &xs, ys.view()), *y);
        }
    }

    #[test]
    fn test_interp_midpoint() {
        let xs = [0.0, 2.0];
        let ys = arr1(&[100.0, 50.0]);
        assert_eq!(interp_or_zero(1.0, &xs, ys.view()), 75.0);
    }

    #[test]
    fn test_interp_zero_outside_domain() {
        let xs = [1.0, 2.0, 3.0];
        let ys = arr1(&[7.0, 8.0, 9.0]);
        assert_eq!(interp_or_zero(0.999, &xs, ys.view()), 0.0);
        assert_eq!(interp_or_zero(3.001, &xs, ys.view()), 0.0);
        assert_eq!(interp_or_zero(f64::NAN, &xs, ys.view()), 0.0);
        assert_eq!(interp_or_zero(1.0, &[], ys.view()), 0.0);
    }

    #[test]
    fn test_single_knot_table() {
        let ys = arr1(&[42.0]);
        assert_eq!(interp_or_zero(0.0, &[0.0], ys.view()), 42.0);
        assert_eq!(interp_or_zero(0.1, &[0.0], ys.view()), 0.0);
    }

    #[test]
    fn test_first_unsorted() {
        assert_eq!(first_unsorted(&[0.0, 1.0, 2.0]), None);
        assert_eq!(first_unsorted(&[0.0, 1.0, 1.0]), Some(2));
        assert_eq!(first_unsorted(&[3.0, 1.0]), Some(1));
        assert_eq!(first_unsorted(&[]), None);
    }
}
