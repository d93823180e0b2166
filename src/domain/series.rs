use serde::{Deserialize, Serialize};

use crate::config::{ClosePrice, HighPrice, LowPrice, OpenPrice, PriceLike};
use crate::domain::{BarInterval, Candle};

/// What `CandleSeries::apply` did with an incoming bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// A new bar was pushed onto the tail.
    Appended,
    /// The still-forming tail bar was rewritten in place.
    UpdatedLast,
    /// The bar predates the tail and was dropped.
    Ignored,
}

/// Struct-of-arrays candle buffer for one pair.
///
/// All vectors are parallel; index `i` across every field is one bar.
/// Append-only, except the most recent bar which may be rewritten in place
/// while it is still forming. Times are strictly increasing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CandleSeries {
    pub pair: String,
    pub interval: BarInterval,
    pub times: Vec<i64>,
    pub opens: Vec<OpenPrice>,
    pub highs: Vec<HighPrice>,
    pub lows: Vec<LowPrice>,
    pub closes: Vec<ClosePrice>,
}

impl CandleSeries {
    pub fn new(pair: impl Into<String>, interval: BarInterval) -> Self {
        Self {
            pair: pair.into(),
            interval,
            times: Vec::new(),
            opens: Vec::new(),
            highs: Vec::new(),
            lows: Vec::new(),
            closes: Vec::new(),
        }
    }

    /// Build a buffer from a batch of bars. Input is sorted by time; when
    /// two bars share a bucket the later one wins (update semantics).
    pub fn from_candles(
        pair: impl Into<String>,
        interval: BarInterval,
        mut candles: Vec<Candle>,
    ) -> Self {
        candles.sort_by_key(|c| c.time);

        let mut series = Self::new(pair, interval);
        series.times.reserve(candles.len());
        series.opens.reserve(candles.len());
        series.highs.reserve(candles.len());
        series.lows.reserve(candles.len());
        series.closes.reserve(candles.len());

        for candle in &candles {
            series.apply(candle);
        }
        series
    }

    /// Absorb one bar. Same bucket as the tail -> in-place update; later
    /// bucket -> append; earlier bucket -> dropped with a warning, since
    /// everything before the tail is immutable.
    pub fn apply(&mut self, candle: &Candle) -> AppendOutcome {
        match self.times.last() {
            Some(&last) if candle.time == last => {
                let idx = self.times.len() - 1;
                self.opens[idx] = candle.open;
                self.highs[idx] = candle.high;
                self.lows[idx] = candle.low;
                self.closes[idx] = candle.close;
                AppendOutcome::UpdatedLast
            }
            Some(&last) if candle.time < last => {
                log::warn!(
                    "{}: dropping out-of-order bar at {} (tail is {})",
                    self.pair,
                    candle.time,
                    last
                );
                AppendOutcome::Ignored
            }
            _ => {
                self.times.push(candle.time);
                self.opens.push(candle.open);
                self.highs.push(candle.high);
                self.lows.push(candle.low);
                self.closes.push(candle.close);
                AppendOutcome::Appended
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn last_time(&self) -> Option<i64> {
        self.times.last().copied()
    }

    pub fn get_candle(&self, idx: usize) -> Candle {
        Candle {
            time: self.times[idx],
            open: self.opens[idx],
            high: self.highs[idx],
            low: self.lows[idx],
            close: self.closes[idx],
        }
    }

    // Raw f64 views for the maths core. One flatten per pass keeps the
    // newtype layer out of the hot loops without per-window allocation.

    pub(crate) fn highs_f64(&self) -> Vec<f64> {
        self.highs.iter().map(|p| p.value()).collect()
    }

    pub(crate) fn lows_f64(&self) -> Vec<f64> {
        self.lows.iter().map(|p| p.value()).collect()
    }

    pub(crate) fn closes_f64(&self) -> Vec<f64> {
        self.closes.iter().map(|p| p.value()).collect()
    }

    /// Clone of the first `end` bars. Intentionally a full copy; used by
    /// offline tooling only (the live engine never truncates).
    pub fn truncated(&self, end: usize) -> CandleSeries {
        let n = end.min(self.len());
        CandleSeries {
            pair: self.pair.clone(),
            interval: self.interval,
            times: self.times[..n].to_vec(),
            opens: self.opens[..n].to_vec(),
            highs: self.highs[..n].to_vec(),
            lows: self.lows[..n].to_vec(),
            closes: self.closes[..n].to_vec(),
        }
    }
}
