//! Empirical extremeness scores for a change series.
//!
//! The walk builds a bin grid over the series' own value range, split into
//! a negative half `[-|min|, 0]` and a positive half `[0, max]`, and drops
//! every value into the first bracket it fits. Bracket weights ramp up
//! across the grid, so a series whose mass sits high in its own range
//! scores high on the max side; reading the ramp back-to-front gives the
//! min side. The exact grid construction and first-hit matching are load
//! bearing for numeric reproducibility; do not replace with a closed-form
//! quantile estimate, the bin-boundary behavior will not match.

use crate::analysis::maths;

/// Brackets allocated per series element.
pub(crate) const BIN_COUNT: usize = 50;

/// Which end of the distribution the score measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScoreSide {
    Max,
    Min,
}

/// Reusable arenas for the grid walk. Contents are rewritten on every
/// call; capacity sticks around so a full evaluation pass allocates once.
#[derive(Debug, Default)]
pub(crate) struct ExtremenessScratch {
    b_neg: Vec<f64>,
    b_pos: Vec<f64>,
    weights: Vec<f64>,
}

impl ExtremenessScratch {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// Raw extremeness of `series` relative to its own value range.
///
/// The caller owns the sanity clamp: a non-finite or out-of-range result
/// is its problem to replace (see the wave composer), because the right
/// fallback needs the previous window's score.
pub(crate) fn score(
    scratch: &mut ExtremenessScratch,
    series: &[f64],
    scale: f64,
    side: ScoreSide,
) -> f64 {
    let len = series.len();
    if len < 2 {
        return 0.0;
    }

    let grid_size = BIN_COUNT * len;
    let steps = (grid_size - 1) as f64;
    let max = maths::max_of(series);
    let min = maths::min_of(series);

    // Bracket bases. Each populated half spans its observed range in
    // grid_size - 1 uniform steps; a bracket is [b[k], b[k] + inc]. The
    // base sits offset from the grid itself: two increments down on the
    // negative half, one up on the positive half.
    let inc_neg = if min < 0.0 { min.abs() / steps } else { 0.0 };
    let inc_pos = if max > 0.0 { max / steps } else { 0.0 };

    scratch.b_neg.clear();
    if min < 0.0 {
        let floor = -min.abs();
        scratch
            .b_neg
            .extend((0..grid_size).map(|k| floor + (k as f64 - 2.0) * inc_neg));
    }

    scratch.b_pos.clear();
    if max > 0.0 {
        scratch
            .b_pos
            .extend((0..grid_size).map(|k| (k as f64 + 1.0) * inc_pos));
    }

    // Weight ramp, normalized by the series' degrees of freedom. The min
    // side reads the same ramp back-to-front.
    let norm = (len - 1) as f64;
    scratch.weights.clear();
    scratch
        .weights
        .extend((0..grid_size).map(|k| (k as f64 + 1.0) * scale / grid_size as f64 / norm));

    let b_neg = &scratch.b_neg[..];
    let b_pos = &scratch.b_pos[..];
    let weights = &scratch.weights[..];
    let weight_at = |k: usize| match side {
        ScoreSide::Max => weights[k],
        ScoreSide::Min => weights[grid_size - 1 - k],
    };

    let mut total = 0.0;
    for &v in series {
        // First-hit walk, negative half before positive. A value that
        // lands in the gap between the bracket ranges (the offset leaves
        // one uncovered increment on each side of zero) matches nothing
        // and contributes nothing.
        let mut matched = None;
        for (k, &b) in b_neg.iter().enumerate() {
            if b <= v && v <= b + inc_neg {
                matched = Some(weight_at(k));
                break;
            }
        }
        if matched.is_none() {
            for (k, &b) in b_pos.iter().enumerate() {
                if b <= v && v <= b + inc_pos {
                    matched = Some(weight_at(k));
                    break;
                }
            }
        }
        if let Some(w) = matched {
            total += w;
        }
    }

    // The two-point walk reads inverted.
    if len == 2 { scale - total } else { total }
}
