mod candle;
mod interval;
mod series;

pub use candle::{Candle, CandleUpdate};
pub use interval::BarInterval;
pub use series::{AppendOutcome, CandleSeries};
