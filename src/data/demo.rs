//! Deterministic synthetic candle generation.
//!
//! A seeded LCG stands in for market noise so the same pair name always
//! produces the same bars; the demo cache, the CLI `--demo` path, and any
//! two machines agree bar for bar.

use crate::config::DemoShape;
use crate::domain::{BarInterval, Candle, CandleSeries};

/// Minimal LCG (Numerical Recipes constants). Not statistical quality,
/// just stable wiggle.
struct Lcg(u64);

impl Lcg {
    fn from_name(name: &str) -> Self {
        let seed = name
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| {
                (acc ^ b as u64).wrapping_mul(0x1000_0000_01b3)
            });
        Self(seed | 1)
    }

    /// Uniform-ish in [0, 1).
    fn next_unit(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Build one synthetic buffer: sine cycle + drift + seeded noise.
pub fn synth_series(
    pair: &str,
    interval: BarInterval,
    start_time: i64,
    bars: usize,
    shape: &DemoShape,
) -> CandleSeries {
    let mut rng = Lcg::from_name(pair);
    let step = interval.secs();

    let mut candles = Vec::with_capacity(bars);
    let mut prev_close = shape.base;

    for i in 0..bars {
        let phase = i as f64 / shape.period_bars * std::f64::consts::TAU;
        let wiggle = (rng.next_unit() - 0.5) * 2.0 * shape.noise;
        let close = shape.base + shape.amplitude * phase.sin() + shape.drift_per_bar * i as f64 + wiggle;

        let open = prev_close;
        let spread = shape.noise * rng.next_unit();
        let high = open.max(close) + spread;
        let low = (open.min(close) - spread).max(0.0);

        candles.push(Candle::new(
            start_time + i as i64 * step,
            open,
            high,
            low,
            close,
        ));
        prev_close = close;
    }

    CandleSeries::from_candles(pair, interval, candles)
}
