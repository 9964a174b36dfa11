//! Sorted search and piecewise-linear interpolation.
//!
//! [`interp1d`] is the numeric core of the whole pipeline: it maps one
//! increasing sequence against another, one value at a time. Unlike a
//! clamping interpolator, positions outside the known range are
//! extrapolated along the nearest end segment, because the anchoring and
//! grid-building steps deliberately evaluate positions (0 bp, the
//! telomere, the 3 Mbp centromere offset) outside the observed markers.

use num_traits::Float;
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

/// Assert two float values are the same up to `eps`.
#[allow(dead_code)]
pub fn assert_float_eq<T>(left: T, right: T, eps: T)
where
    T: Float + Display,
{
    if left.is_nan() {
        assert!(right.is_nan(), "left is NaN, but right is not");
    } else {
        let diff = (left - right).abs();
        assert!(
            diff < eps,
            "values |{} - {}| ≥ {} (diff: {})",
            left,
            right,
            eps,
            diff
        );
    }
}

/// Assert two float slices are elementwise the same up to `eps`.
#[allow(dead_code)]
pub fn assert_floats_eq<T>(left: &[T], right: &[T], eps: T)
where
    T: Float + Display,
{
    assert_eq!(left.len(), right.len());
    for (l, r) in left.iter().zip(right.iter()) {
        assert_float_eq(*l, *r, eps)
    }
}

#[derive(Debug, PartialEq)]
pub enum SearchResult {
    /// `vec[idx]` equals the probe exactly.
    Exact(usize),
    /// The probe is below `vec[0]`.
    Below,
    /// The probe falls between `vec[idx - 1]` and `vec[idx]`.
    Between(usize),
    /// The probe is above the last element.
    Above,
}

/// Binary search over a sorted slice, classifying where the probe lands.
///
/// Ties against duplicated elements resolve to one of the equal indices;
/// interpolation through either bracket yields the same value.
pub fn search_sorted<T: PartialOrd>(vec: &[T], probe: &T) -> SearchResult {
    let mut left = 0;
    let mut right = vec.len();
    while left < right {
        let mid = left + (right - left) / 2;
        match vec[mid].partial_cmp(probe).unwrap() {
            Ordering::Less => left = mid + 1,
            Ordering::Greater => right = mid,
            Ordering::Equal => return SearchResult::Exact(mid),
        }
    }
    if left == 0 {
        SearchResult::Below
    } else if left < vec.len() {
        SearchResult::Between(left)
    } else {
        SearchResult::Above
    }
}

/// Piecewise-linear interpolation of `y` over `x` at `x0`, with linear
/// extrapolation beyond either end of `x`.
///
/// `x` must be sorted ascending and paired 1:1 with `y`. Returns `None`
/// when fewer than two points are available, since neither interpolation
/// nor extrapolation is defined there; callers translate that into a
/// missing-map-data error. A degenerate bracket (`x2 == x1`) yields the
/// left value, treating the segment as flat.
pub fn interp1d<T>(x: &[T], y: &[T], x0: T) -> Option<T>
where
    T: Float + Debug,
{
    assert_eq!(x.len(), y.len());
    if x.len() < 2 {
        return None;
    }

    let segment = |lo: usize, hi: usize| {
        let (x1, x2) = (x[lo], x[hi]);
        let (y1, y2) = (y[lo], y[hi]);
        if x2 == x1 {
            return y1;
        }
        y1 + (y2 - y1) * (x0 - x1) / (x2 - x1)
    };

    let y0 = match search_sorted(x, &x0) {
        SearchResult::Exact(idx) => y[idx],
        SearchResult::Between(idx) => segment(idx - 1, idx),
        SearchResult::Below => segment(0, 1),
        SearchResult::Above => segment(x.len() - 2, x.len() - 1),
    };
    Some(y0)
}
