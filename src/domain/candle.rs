use serde::{Deserialize, Serialize};

use crate::config::{ClosePrice, HighPrice, LowPrice, OpenPrice};

/// One OHLC bar. `time` is the bar-bucket start in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: OpenPrice,
    pub high: HighPrice,
    pub low: LowPrice,
    pub close: ClosePrice,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open: OpenPrice::new(open),
            high: HighPrice::new(high),
            low: LowPrice::new(low),
            close: ClosePrice::new(close),
        }
    }
}

/// A live feed message: one bar for one pair, possibly still forming.
/// Closed bars are immutable once absorbed; an open bar keeps replacing
/// the buffer tail until its `is_closed` message arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleUpdate {
    pub pair: String,
    pub candle: Candle,
    pub is_closed: bool,
}
