#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod utils;

// Re-export commonly used types outside of crate (for the binaries)
pub use analysis::{RegimeEval, SignalEvent, SignalLedger, SignalSide, WavePoint, Zone,
    evaluate_series};
pub use config::{EngineConfig, WaveParams};
pub use domain::{BarInterval, Candle, CandleSeries, CandleUpdate};
pub use engine::{RegimeEngine, RegimeSnapshot};

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Candle cache file to analyse (see make_demo_cache). Defaults to the
    /// standard cache location for the configured interval.
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Generate the deterministic demo pairs in memory instead of reading
    /// a cache file
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Trailing window length in bars
    #[arg(long)]
    pub window: Option<usize>,

    /// EMA period for the smoothed price proxy (enables smoothing)
    #[arg(long)]
    pub smooth: Option<usize>,

    /// Gate zone flips behind the fast/slow EMA trend filter
    #[arg(long, default_value_t = false)]
    pub trend_filter: bool,

    /// Write the full per-pair signal history to this JSON file
    #[arg(long)]
    pub signals_json: Option<PathBuf>,

    /// Stream the last N bars through the live engine after the report,
    /// printing signals as they surface (the trade-gating consumer path)
    #[arg(long, default_value_t = 0)]
    pub replay: usize,

    /// Replay hold-out signals into round-trip trades after the main report
    #[cfg(feature = "backtest")]
    #[arg(long, default_value_t = false)]
    pub backtest: bool,
}

impl Cli {
    /// Fold the CLI flags into the compiled-in defaults.
    pub fn wave_params(&self) -> WaveParams {
        let mut params = config::ENGINE.wave;
        if let Some(window) = self.window {
            params.window_len = window;
        }
        if let Some(period) = self.smooth {
            params.smoothing.enabled = true;
            params.smoothing.period = period;
        }
        params.trend_filter.enabled = self.trend_filter;
        params
    }
}
