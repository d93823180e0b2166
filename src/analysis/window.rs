use crate::analysis::maths;

/// Floor for the window span, so a dead-flat window divides cleanly
/// instead of raising.
pub(crate) const SPAN_EPSILON: f64 = 1e-9;

/// High/low envelope of one trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WindowBounds {
    pub hi: f64,
    pub lo: f64,
    pub span: f64,
}

impl WindowBounds {
    /// Reference mid-price of the window.
    pub(crate) fn mid(&self) -> f64 {
        (self.hi + self.lo) / 2.0
    }
}

/// Extract the trailing window of `n` bars ending at `idx` (inclusive):
/// the high/low envelope plus the percentage-change series of the closes,
/// written into the reusable `changes` buffer.
///
/// Returns None when the window does not fit yet, or when the change
/// series would carry fewer than two values (n < 3) and so cannot feed the
/// distribution walk. Callers skip such indices.
///
/// For a smoothed pass the caller hands the EMA proxy as all three arrays,
/// which collapses the envelope to the EMA's own range over the window.
pub(crate) fn extract_into(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    idx: usize,
    n: usize,
    changes: &mut Vec<f64>,
) -> Option<WindowBounds> {
    if n < 3 || idx + 1 < n {
        return None;
    }
    let start = idx + 1 - n;

    let hi = maths::max_of(&highs[start..=idx]);
    let lo = maths::min_of(&lows[start..=idx]);

    maths::percent_changes_into(&closes[start..=idx], changes);
    if changes.len() < 2 {
        return None;
    }

    Some(WindowBounds {
        hi,
        lo,
        span: (hi - lo).max(SPAN_EPSILON),
    })
}
