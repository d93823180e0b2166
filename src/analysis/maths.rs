use argminmax::ArgMinMax;
use itertools::Itertools;

#[inline]
pub(crate) fn max_of(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

#[inline]
pub(crate) fn min_of(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

/// Percentage change between consecutive values, written into `out`.
/// A non-positive previous value yields 0.0 for that step (no blow-ups on
/// bad data; newtype construction already floors prices at zero).
#[inline]
pub(crate) fn percent_changes_into(values: &[f64], out: &mut Vec<f64>) {
    out.clear();
    out.extend(values.iter().tuple_windows().map(|(prev, curr)| {
        if *prev > f64::EPSILON {
            (curr - prev) / prev * 100.0
        } else {
            0.0
        }
    }));
}

/// Running EMA over `values`, one output per input, seeded with the first
/// value. Multiplier k = 2 / (period + 1).
pub(crate) fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let k = 2.0 / (period as f64 + 1.0);

    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);

    for &v in &values[1..] {
        prev = v * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}
