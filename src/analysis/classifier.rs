//! BLUE/ORANGE zone classification.
//!
//! A fold over the wave history, re-run from scratch on every evaluation.
//! There is no persisted classifier state: the running zone is a pure
//! function of the points, the thresholds, and the optional trend gate,
//! which is what makes re-evaluation (and parameter changes) safe.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::analysis::wave::WavePoint;
use crate::config::HysteresisThresholds;

/// The binary market-regime label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Zone {
    #[strum(to_string = "BLUE")]
    Blue,
    #[strum(to_string = "ORANGE")]
    Orange,
}

/// Per-point fast/slow EMA pair for the trend gate, index-aligned with
/// the wave points.
pub(crate) type TrendPair = (f64, f64);

#[inline]
fn allows_orange(trend: Option<&[TrendPair]>, i: usize) -> bool {
    trend.is_none_or(|t| t[i].0 <= t[i].1)
}

#[inline]
fn allows_blue(trend: Option<&[TrendPair]>, i: usize) -> bool {
    trend.is_none_or(|t| t[i].0 >= t[i].1)
}

/// Fold the wave history into one zone per point.
///
/// The first point seeds the zone from which side of center it sits on;
/// after that a flip needs the ratio to clear a threshold (and the trend
/// gate, when enabled). Anything inside the dead zone keeps the running
/// zone. A non-finite ratio fails every comparison and also keeps it.
pub(crate) fn classify(
    points: &[WavePoint],
    trend: Option<&[TrendPair]>,
    thresholds: &HysteresisThresholds,
) -> Vec<Zone> {
    debug_assert!(trend.is_none_or(|t| t.len() == points.len()));

    let mut zones = Vec::with_capacity(points.len());
    let mut current: Option<Zone> = None;

    for (i, point) in points.iter().enumerate() {
        let r = point.ratio;
        let next = match current {
            None => {
                if r >= 0.5 {
                    Zone::Orange
                } else {
                    Zone::Blue
                }
            }
            Some(Zone::Blue) => {
                if r >= thresholds.high && allows_orange(trend, i) {
                    Zone::Orange
                } else {
                    Zone::Blue
                }
            }
            Some(Zone::Orange) => {
                if r <= thresholds.low && allows_blue(trend, i) {
                    Zone::Blue
                } else {
                    Zone::Orange
                }
            }
        };
        current = Some(next);
        zones.push(next);
    }
    zones
}
