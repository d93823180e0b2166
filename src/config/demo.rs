//! Demo data configuration
//!
//! Shapes for the deterministic synthetic pairs used by `make_demo_cache`
//! and the CLI `--demo` flag. No network access anywhere in this crate, so
//! these are the only "market data" a fresh checkout can produce.

/// Waveform description for one synthetic pair.
#[derive(Debug, Clone, Copy)]
pub struct DemoShape {
    /// Price level the waveform oscillates around.
    pub base: f64,
    /// Peak deviation of the cyclic component.
    pub amplitude: f64,
    /// Bars per full cycle of the cyclic component.
    pub period_bars: f64,
    /// Linear drift added per bar (can be negative).
    pub drift_per_bar: f64,
    /// Peak magnitude of the deterministic noise component.
    pub noise: f64,
}

pub struct DemoConfig {
    pub pairs: &'static [(&'static str, DemoShape)],
    /// Bars generated per pair.
    pub bars: usize,
    /// Epoch-seconds start of the first bar bucket.
    pub start_time: i64,
}

pub const DEMO: DemoConfig = DemoConfig {
    pairs: &[
        (
            "BTCUSDT",
            DemoShape {
                base: 64_000.0,
                amplitude: 1_800.0,
                period_bars: 120.0,
                drift_per_bar: 2.5,
                noise: 120.0,
            },
        ),
        (
            "ETHUSDT",
            DemoShape {
                base: 3_100.0,
                amplitude: 140.0,
                period_bars: 90.0,
                drift_per_bar: -0.4,
                noise: 9.0,
            },
        ),
        (
            "SOLUSDT",
            DemoShape {
                base: 145.0,
                amplitude: 11.0,
                period_bars: 60.0,
                drift_per_bar: 0.01,
                noise: 0.8,
            },
        ),
    ],
    bars: 2_000,
    // 2025-01-01 00:00:00 UTC, already 5m-bucket aligned
    start_time: 1_735_689_600,
};
