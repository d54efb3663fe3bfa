//! Linear-interpolation quantiles over non-missing values.

/// Drops missing values and sorts the rest ascending.
pub fn sorted_present(values: &[Option<f64>]) -> Vec<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    present.sort_by(f64::total_cmp);
    present
}

/// Quantile `q` of an ascending slice.
///
/// Uses the position `h = (n - 1) * q` and interpolates linearly between the
/// neighbouring order statistics. Returns `None` for an empty slice or a `q`
/// outside `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let h = (sorted.len() - 1) as f64 * q;
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }

    let (low, high) = (sorted[lower], sorted[upper]);
    Some(low + (h - lower as f64) * (high - low))
}
