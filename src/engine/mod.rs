mod core;
mod state;

#[cfg(feature = "backtest")]
mod backtest;

pub use self::core::RegimeEngine;
pub use state::{PairState, RegimeSnapshot};

#[cfg(feature = "backtest")]
pub use backtest::{BacktestConfig, BacktestReport, TradeRecord, run_backtest};
