//! Local and final reductions.

/// Arithmetic mean of a non-empty slice.
///
/// Accumulates in f64 so the summation error stays small even for large
/// chunks. Callers validate the element count up front; an empty slice is a
/// caller bug.
pub fn mean(values: &[f32]) -> f32 {
    debug_assert!(!values.is_empty(), "mean of an empty slice");
    let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
    (sum / values.len() as f64) as f32
}
