use std::sync::Arc;

use serde::Serialize;

use crate::analysis::{SignalEvent, SignalLedger, WavePoint, Zone};
use crate::domain::CandleSeries;

/// One published engine pass for one pair.
///
/// Built in full, then swapped in as a single `Arc` assignment, so readers
/// either see the previous pass or this one, never a half-written mix.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeSnapshot {
    pub pair: String,
    /// Wall-clock stamp of the pass (ms).
    pub computed_at_ms: i64,
    /// Buffer size the pass saw.
    pub candle_count: usize,
    /// Zone at the most recent bar. None until enough data exists.
    pub zone: Option<Zone>,
    /// Reference mid-price of the most recent window.
    pub baseline: Option<f64>,
    pub wave: Vec<WavePoint>,
    /// Full re-derived signal history.
    pub signals: Vec<SignalEvent>,
    /// Subset of `signals` never surfaced before this pass. This is what
    /// trade-gating listeners consume; charts take the full history.
    pub fresh_signals: Vec<SignalEvent>,
}

/// Per-pair engine state.
#[derive(Debug)]
pub struct PairState {
    pub series: CandleSeries,

    /// THE FRONT BUFFER.
    /// Readers grab this every time they care. It is never locked; a new
    /// snapshot simply replaces the Arc pointer.
    pub snapshot: Option<Arc<RegimeSnapshot>>,

    /// Replay guard across recomputes.
    pub(crate) ledger: SignalLedger,

    /// Buffer changed since the last pass.
    pub(crate) dirty: bool,
    pub(crate) last_recompute_ms: i64,

    /// Last configuration problem (if any) for display.
    pub last_error: Option<String>,
}

impl PairState {
    pub fn new(series: CandleSeries) -> Self {
        Self {
            series,
            snapshot: None,
            ledger: SignalLedger::new(),
            dirty: true,
            last_recompute_ms: 0,
            last_error: None,
        }
    }
}
