//! Precision/recall arithmetic
//!
//! `a` is the true-positive count, `b` the false-positive count and `c`
//! the false-negative count at some operating point.

/// Tolerance used when comparing precision/recall differences
pub const FP_COMPARISON_DELTA: f64 = 1e-9;

/// `a / (a + b)`, or 1 when nothing was classified into the category
pub fn precision(a: usize, b: usize) -> f64 {
    if a + b == 0 {
        return 1.0;
    }
    a as f64 / (a + b) as f64
}

/// `a / (a + c)`, or 1 when the category has no members
pub fn recall(a: usize, c: usize) -> f64 {
    if a + c == 0 {
        return 1.0;
    }
    a as f64 / (a + c) as f64
}
