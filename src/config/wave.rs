//! Wave engine configuration

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::domain::BarInterval;

/// Default trailing window length in bars. Long enough for a meaningful
/// empirical change distribution, short enough to track regime turns.
pub const DEFAULT_WINDOW_LEN: usize = 50;

/// Weight ramp ceiling for the distribution walk. The two extremeness
/// scores sum to roughly this value for any non-degenerate window, so it
/// fixes the numeric scale of the band levels.
pub const DEFAULT_SCALE: f64 = 5.5;

/// Optional EMA substitution for the window source.
/// When enabled, high/low/close are all replaced by the EMA of closes, so
/// the band span collapses to the EMA's own range over the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub enabled: bool,
    pub period: usize,
}

/// Fast/slow EMA gate for zone transitions.
/// A flip into ORANGE requires fast <= slow, a flip into BLUE requires
/// fast >= slow. Disabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFilterParams {
    pub enabled: bool,
    pub fast_period: usize,
    pub slow_period: usize,
}

/// The chatter-prevention dead zone.
/// Positions inside [low, high) leave the running zone unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HysteresisThresholds {
    pub low: f64,
    pub high: f64,
}

/// Parameters for one full wave/zone evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    /// Trailing window length N (bars). Minimum 5.
    pub window_len: usize,
    /// Weight ramp ceiling for the distribution walk.
    pub scale: f64,
    pub smoothing: SmoothingParams,
    pub trend_filter: TrendFilterParams,
    pub thresholds: HysteresisThresholds,
}

impl WaveParams {
    /// Reject bad configuration before any computation starts.
    /// Data-quality problems are never errors; parameter mistakes are.
    pub fn validate(&self) -> Result<()> {
        if self.window_len < 5 {
            bail!("window_len must be >= 5 (got {})", self.window_len);
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            bail!("scale must be a positive finite number (got {})", self.scale);
        }
        if self.smoothing.enabled && self.smoothing.period == 0 {
            bail!("smoothing.period must be >= 1 when smoothing is enabled");
        }
        if self.trend_filter.enabled
            && (self.trend_filter.fast_period == 0 || self.trend_filter.slow_period == 0)
        {
            bail!("trend_filter periods must be >= 1 when the filter is enabled");
        }
        let t = &self.thresholds;
        if !(t.low > 0.0 && t.low < t.high && t.high < 1.0) {
            bail!(
                "thresholds must satisfy 0 < low < high < 1 (got low={}, high={})",
                t.low,
                t.high
            );
        }
        Ok(())
    }

    /// Minimum buffer size before any output is produced.
    pub(crate) fn min_candles(&self) -> usize {
        self.window_len.max(5)
    }
}

impl Default for WaveParams {
    fn default() -> Self {
        ENGINE.wave
    }
}

/// The Master Engine Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Candle interval all buffers are bucketed by.
    pub interval: BarInterval,
    /// Minimum seconds between recomputes triggered by intra-bar updates.
    /// Bar closes and parameter changes always recompute immediately.
    /// 0 disables the limit.
    pub min_recompute_interval_secs: i64,
    pub wave: WaveParams,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_recompute_interval_secs < 0 {
            bail!(
                "min_recompute_interval_secs must be >= 0 (got {})",
                self.min_recompute_interval_secs
            );
        }
        self.wave.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        ENGINE
    }
}

pub const ENGINE: EngineConfig = EngineConfig {
    interval: BarInterval::M5,
    min_recompute_interval_secs: 1,

    wave: WaveParams {
        window_len: DEFAULT_WINDOW_LEN,
        scale: DEFAULT_SCALE,

        smoothing: SmoothingParams {
            enabled: false,
            // 9 bars tracks price closely while still killing single-bar spikes
            period: 9,
        },

        trend_filter: TrendFilterParams {
            enabled: false,
            fast_period: 12,
            slow_period: 26,
        },

        // The dead zone. Symmetric around 0.5; widen to trade latency for calm.
        thresholds: HysteresisThresholds {
            low: 0.45,
            high: 0.55,
        },
    },
};
