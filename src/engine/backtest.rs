//! Walk-forward signal backtest.
//!
//! Enabled via the `backtest` Cargo feature. Entry point: [`run_backtest`].
//!
//! # Approach
//! The most recent `holdout_candles` bars are the out-of-sample hold-out
//! set. Every per-bar output of the evaluation pass depends only on the
//! trailing window ending at that bar and on the zone fold over earlier
//! bars, so re-running the pipeline on growing truncations would reproduce
//! the full-series outputs index for index. One full pass therefore IS the
//! walk-forward result, and the runner only has to replay the signals that
//! fall inside the hold-out period:
//!
//! 1. Evaluate the whole series once.
//! 2. Keep the signals stamped inside the hold-out window.
//! 3. Pair BUY -> SELL into round-trip trades, filled at the close of the
//!    signal bar; a position still open at the end of data is closed at
//!    the final bar's close.
//! 4. Aggregate into a [`BacktestReport`].

#[cfg(feature = "backtest")]
use {
    crate::{
        analysis::{SignalSide, evaluate_series},
        config::{PriceLike, WaveParams},
        domain::CandleSeries,
    },
    serde::Serialize,
    uuid::Uuid,
};

// ─── Public config ────────────────────────────────────────────────────────────

/// Configuration for a single backtest run.
#[cfg(feature = "backtest")]
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Parameters the evaluation runs with.
    pub params: WaveParams,
    /// How many trailing bars form the hold-out set.
    /// At 5-min resolution, one day is 288 bars.
    pub holdout_candles: usize,
    /// Minimum bars that must precede the hold-out set. A sensible floor
    /// is a few windows' worth, so the first hold-out bar already has a
    /// settled zone history behind it.
    pub min_training_candles: usize,
}

#[cfg(feature = "backtest")]
impl Default for BacktestConfig {
    fn default() -> Self {
        let params = WaveParams::default();
        Self {
            params,
            // One day of 5-min bars
            holdout_candles: 288,
            min_training_candles: params.window_len * 3,
        }
    }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// One BUY -> SELL round trip (long only; the zone gates direction).
#[cfg(feature = "backtest")]
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub trade_id: String,
    pub pair: String,
    pub entry_time: i64,
    pub exit_time: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Fractional PnL, e.g. 0.02 = +2 %.
    pub pnl: f64,
    /// True when the position was force-closed at the end of data rather
    /// than by a SELL signal.
    pub forced_exit: bool,
}

/// Summary statistics for one completed backtest.
#[cfg(feature = "backtest")]
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub pair: String,
    /// Signals that fell inside the hold-out window.
    pub signals_replayed: usize,
    pub trades: Vec<TradeRecord>,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    /// Mean fractional PnL across trades.
    pub avg_pnl: f64,
}

#[cfg(feature = "backtest")]
impl BacktestReport {
    fn empty(pair: &str) -> Self {
        Self {
            pair: pair.to_string(),
            signals_replayed: 0,
            trades: Vec::new(),
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            avg_pnl: 0.0,
        }
    }
}

// ─── Main entry point ─────────────────────────────────────────────────────────

/// Replay hold-out signals for one pair into round-trip trades.
#[cfg(feature = "backtest")]
pub fn run_backtest(series: &CandleSeries, config: &BacktestConfig) -> BacktestReport {
    let pair = series.pair.clone();
    let total = series.len();

    let split = total.saturating_sub(config.holdout_candles);
    if split < config.min_training_candles {
        log::warn!(
            "[backtest] {}: not enough training data \
             (total={}, holdout={}, split={}, min_training={}). Skipping.",
            pair,
            total,
            config.holdout_candles,
            split,
            config.min_training_candles,
        );
        return BacktestReport::empty(&pair);
    }

    let holdout_start_time = series.times[split];
    log::info!(
        "[backtest] {} | window={} | split={} | holdout={} bars",
        pair,
        config.params.window_len,
        split,
        config.holdout_candles,
    );

    let eval = evaluate_series(series, &config.params);

    // Close lookup by bar time for signal fills
    let close_at = |time: i64| -> Option<f64> {
        series
            .times
            .binary_search(&time)
            .ok()
            .map(|idx| series.closes[idx].value())
    };

    let replayed: Vec<_> = eval
        .signals
        .iter()
        .filter(|s| s.time >= holdout_start_time)
        .collect();

    let mut trades: Vec<TradeRecord> = Vec::new();
    let mut open_position: Option<(i64, f64)> = None;

    for signal in &replayed {
        match signal.side {
            SignalSide::Buy => {
                // Alternation makes a double-entry impossible; keep the
                // first entry if it ever happened anyway.
                if open_position.is_none() {
                    if let Some(price) = close_at(signal.time) {
                        open_position = Some((signal.time, price));
                    }
                }
            }
            SignalSide::Sell => {
                if let Some((entry_time, entry_price)) = open_position.take() {
                    if let Some(exit_price) = close_at(signal.time) {
                        trades.push(make_trade(
                            &pair,
                            entry_time,
                            signal.time,
                            entry_price,
                            exit_price,
                            false,
                        ));
                    }
                }
            }
        }
    }

    // Force-close a dangling position at the last bar
    if let Some((entry_time, entry_price)) = open_position.take() {
        if let (Some(&exit_time), Some(exit)) = (series.times.last(), series.closes.last()) {
            trades.push(make_trade(
                &pair,
                entry_time,
                exit_time,
                entry_price,
                exit.value(),
                true,
            ));
        }
    }

    let wins = trades.iter().filter(|t| t.pnl > 0.0).count();
    let losses = trades.len() - wins;
    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64
    };
    let avg_pnl = if trades.is_empty() {
        0.0
    } else {
        trades.iter().map(|t| t.pnl).sum::<f64>() / trades.len() as f64
    };

    let report = BacktestReport {
        pair: pair.clone(),
        signals_replayed: replayed.len(),
        trades,
        wins,
        losses,
        win_rate,
        avg_pnl,
    };

    log::info!(
        "[backtest] {} COMPLETE | replayed={} | trades={} | wins={} | losses={} | \
         win_rate={:.1}% | avg_pnl={:.3}%",
        pair,
        report.signals_replayed,
        report.trades.len(),
        report.wins,
        report.losses,
        report.win_rate * 100.0,
        report.avg_pnl * 100.0,
    );

    report
}

#[cfg(feature = "backtest")]
fn make_trade(
    pair: &str,
    entry_time: i64,
    exit_time: i64,
    entry_price: f64,
    exit_price: f64,
    forced_exit: bool,
) -> TradeRecord {
    let pnl = if entry_price > f64::EPSILON {
        (exit_price - entry_price) / entry_price
    } else {
        0.0
    };
    TradeRecord {
        trade_id: Uuid::new_v4().to_string(),
        pair: pair.to_string(),
        entry_time,
        exit_time,
        entry_price,
        exit_price,
        pnl,
        forced_exit,
    }
}

#[cfg(all(test, feature = "backtest"))]
mod tests {
    use super::*;
    use crate::config::ENGINE;
    use crate::domain::{BarInterval, Candle};

    fn series_from_closes(closes: &[f64]) -> CandleSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 300, c, c, c, c))
            .collect();
        CandleSeries::from_candles("TESTUSDT", BarInterval::M5, candles)
    }

    fn segmented_closes(segments: &[(usize, f64)]) -> Vec<f64> {
        let mut closes = Vec::new();
        let mut price = 100.0;
        for &(bars, step_pct) in segments {
            let factor = 1.0 + step_pct / 100.0;
            for _ in 0..bars {
                closes.push(price);
                price *= factor;
            }
        }
        closes
    }

    fn config(window_len: usize, holdout: usize) -> BacktestConfig {
        let mut params = ENGINE.wave;
        params.window_len = window_len;
        BacktestConfig {
            params,
            holdout_candles: holdout,
            min_training_candles: window_len * 2,
        }
    }

    #[test]
    fn test_too_little_training_data_skips() {
        let series = series_from_closes(&[100.0; 60]);
        let report = run_backtest(&series, &config(10, 55));
        assert!(report.trades.is_empty());
        assert_eq!(report.signals_replayed, 0);
    }

    #[test]
    fn test_flat_holdout_produces_no_trades() {
        let series = series_from_closes(&[100.0; 200]);
        let report = run_backtest(&series, &config(10, 100));
        assert_eq!(report.signals_replayed, 0);
        assert!(report.trades.is_empty());
        assert_eq!(report.win_rate, 0.0);
    }

    #[test]
    fn test_round_trips_pair_up() {
        // Training climb, then fall/climb/fall/climb inside the hold-out:
        // BUY at each fall onset, SELL at each recovery.
        let closes = segmented_closes(&[
            (60, 0.5),
            (40, -0.5),
            (40, 0.5),
            (40, -0.5),
            (40, 0.5),
        ]);
        let series = series_from_closes(&closes);
        let report = run_backtest(&series, &config(10, 160));

        assert_eq!(report.signals_replayed, 4);
        assert_eq!(report.trades.len(), 2);
        for trade in &report.trades {
            assert!(!trade.forced_exit);
            assert!(trade.exit_time > trade.entry_time);
        }
        assert_eq!(report.wins + report.losses, 2);
    }

    #[test]
    fn test_dangling_position_force_closes() {
        // Ends mid-fall: the last BUY never gets its SELL.
        let closes = segmented_closes(&[(60, 0.5), (40, -0.5)]);
        let series = series_from_closes(&closes);
        let report = run_backtest(&series, &config(10, 60));

        assert_eq!(report.trades.len(), 1);
        let trade = &report.trades[0];
        assert!(trade.forced_exit);
        assert_eq!(trade.exit_time, *series.times.last().unwrap());
        // Bought into a fall and rode it down
        assert!(trade.pnl < 0.0);
    }
}
