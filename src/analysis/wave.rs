//! Band and wave composition.
//!
//! Per evaluated bar: score the window's change series from both sides,
//! project the scores onto the window's price span as two band levels, and
//! place the wave at the score-weighted blend position between the bands.
//! The normalized blend position is what the zone classifier consumes.

use serde::{Deserialize, Serialize};

use crate::analysis::extremeness::{self, ExtremenessScratch, ScoreSide};
use crate::analysis::window;
use crate::config::WaveParams;

/// One evaluated bar of the wave series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WavePoint {
    pub time: i64,
    /// Blend position between the two band levels, in price units.
    pub value: f64,
    /// Normalized position of `value` between the band extremes, in [0, 1].
    pub ratio: f64,
}

/// Full wave history for one buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveSeries {
    pub points: Vec<WavePoint>,
    /// Candle index of `points[0]`; points cover indices
    /// `first_idx..first_idx + points.len()` contiguously.
    pub first_idx: usize,
    /// Mid-price of the most recent window. Reference line only; no part
    /// of the score computation reads it.
    pub baseline: Option<f64>,
}

/// Replace an unusable raw score with the previous window's, for visual
/// and logical continuity (zero would tear the wave). Returns the settled
/// score clamped into [0, 100].
fn settle(raw: f64, last_valid: &mut Option<f64>) -> f64 {
    let score = if raw.is_finite() && raw.abs() <= 100.0 {
        *last_valid = Some(raw);
        raw
    } else {
        last_valid.unwrap_or(0.0)
    };
    score.clamp(0.0, 100.0)
}

/// Compose the wave series over flattened price arrays.
///
/// The three slices must be index-aligned with `times`. A smoothed pass
/// hands the EMA proxy as all three, which is what collapses the band
/// span onto the EMA's own range.
pub(crate) fn compose(
    times: &[i64],
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    params: &WaveParams,
) -> WaveSeries {
    let n = params.window_len;
    let count = times.len();

    let mut scratch = ExtremenessScratch::new();
    let mut changes: Vec<f64> = Vec::new();

    let mut points = Vec::with_capacity(count.saturating_sub(n.saturating_sub(1)));
    let mut first_idx: Option<usize> = None;
    let mut last_bounds: Option<window::WindowBounds> = None;

    // Continuity fallbacks, threaded through the loop rather than cached
    // at module level: each pass starts clean.
    let mut last_valid_max: Option<f64> = None;
    let mut last_valid_min: Option<f64> = None;

    for idx in 0..count {
        let Some(bounds) = window::extract_into(highs, lows, closes, idx, n, &mut changes) else {
            continue;
        };

        let raw_max = extremeness::score(&mut scratch, &changes, params.scale, ScoreSide::Max);
        let raw_min = extremeness::score(&mut scratch, &changes, params.scale, ScoreSide::Min);
        let max_score = settle(raw_max, &mut last_valid_max);
        let min_score = settle(raw_min, &mut last_valid_min);

        let band_max = bounds.lo + bounds.span * (max_score / 100.0);
        let band_min = bounds.lo + bounds.span * (min_score / 100.0);

        let total = max_score + min_score;
        let ratio = if total > 0.0 { max_score / total } else { 0.5 };

        let (b_lo, b_hi) = if band_max < band_min {
            (band_max, band_min)
        } else {
            (band_min, band_max)
        };
        let value = b_lo + (b_hi - b_lo) * ratio;

        first_idx.get_or_insert(idx);
        last_bounds = Some(bounds);
        points.push(WavePoint {
            time: times[idx],
            value,
            ratio,
        });
    }

    WaveSeries {
        points,
        first_idx: first_idx.unwrap_or(0),
        baseline: last_bounds.map(|b| b.mid()),
    }
}
