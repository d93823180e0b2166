use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::analysis::{SignalEvent, Zone, evaluate_series};
use crate::config::{EngineConfig, WaveParams};
use crate::domain::{AppendOutcome, CandleSeries, CandleUpdate};
use crate::engine::state::{PairState, RegimeSnapshot};
use crate::utils::TimeUtils;

/// The streaming front of the crate.
///
/// Owns one candle buffer per pair and republishes a full evaluation
/// snapshot whenever the data or the parameters move. Single-threaded by
/// design: one writer feeds it, each pass is synchronous and atomic from
/// the outside (snapshot readers see whole passes only, via the Arc swap).
pub struct RegimeEngine {
    /// Registry of all pairs
    pairs: HashMap<String, PairState>,

    config: EngineConfig,

    /// Per-pair parameter overrides (pair name -> params).
    overrides: HashMap<String, WaveParams>,
}

impl RegimeEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pairs: HashMap::new(),
            config,
            overrides: HashMap::new(),
        })
    }

    /// Adopt an existing buffer (bulk load path). Marks it for evaluation
    /// on the next tick.
    pub fn register(&mut self, series: CandleSeries) {
        let pair = series.pair.clone();
        self.pairs.insert(pair, PairState::new(series));
    }

    /// Absorb one live bar.
    ///
    /// A closed bar recomputes immediately (that is the natural tick of
    /// this engine). An open-bar update only marks the pair dirty; the
    /// rate limiter decides on the next `tick` whether a pass is due, so a
    /// burst of intra-bar updates cannot trigger a pass per message.
    pub fn ingest(&mut self, update: &CandleUpdate) {
        let interval = self.config.interval;
        let state = self.pairs.entry(update.pair.clone()).or_insert_with(|| {
            log::info!("registering new pair {} on first bar", update.pair);
            PairState::new(CandleSeries::new(update.pair.clone(), interval))
        });

        #[cfg(debug_assertions)]
        if interval.bucket_start(update.candle.time) != update.candle.time {
            log::debug!(
                "{}: bar time {} is not {}-bucket aligned",
                update.pair,
                update.candle.time,
                interval
            );
        }

        if state.series.apply(&update.candle) == AppendOutcome::Ignored {
            return;
        }
        state.dirty = true;

        if update.is_closed {
            self.recompute_pair(&update.pair);
        } else {
            self.maybe_recompute(&update.pair);
        }
    }

    /// Host heartbeat: run any rate-limited passes that fell due.
    pub fn tick(&mut self) {
        let due: Vec<String> = self
            .pairs
            .iter()
            .filter(|(_, s)| s.dirty)
            .map(|(name, _)| name.clone())
            .collect();
        for pair in due {
            self.maybe_recompute(&pair);
        }
    }

    /// Swap in new default parameters and re-derive every pair's history.
    pub fn set_params(&mut self, params: WaveParams) -> Result<()> {
        params.validate()?;
        self.config.wave = params;
        self.recompute_all();
        Ok(())
    }

    /// Pin parameters for one pair (wins over the engine default).
    pub fn set_override(&mut self, pair: impl Into<String>, params: WaveParams) -> Result<()> {
        params.validate()?;
        let pair = pair.into();
        self.overrides.insert(pair.clone(), params);
        if self.pairs.contains_key(&pair) {
            self.recompute_pair(&pair);
        }
        Ok(())
    }

    pub fn force_recompute(&mut self, pair: &str) {
        if self.pairs.contains_key(pair) {
            self.recompute_pair(pair);
        }
    }

    // --- Accessors ---

    pub fn snapshot(&self, pair: &str) -> Option<Arc<RegimeSnapshot>> {
        self.pairs.get(pair).and_then(|s| s.snapshot.clone())
    }

    /// Zone at the most recent bar, straight off the published snapshot.
    pub fn current_zone(&self, pair: &str) -> Option<Zone> {
        self.snapshot(pair).and_then(|s| s.zone)
    }

    pub fn pair_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pairs.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn candle_count(&self, pair: &str) -> usize {
        self.pairs.get(pair).map(|s| s.series.len()).unwrap_or(0)
    }

    pub fn last_error(&self, pair: &str) -> Option<String> {
        self.pairs.get(pair).and_then(|s| s.last_error.clone())
    }

    pub fn params_for(&self, pair: &str) -> &WaveParams {
        self.overrides.get(pair).unwrap_or(&self.config.wave)
    }

    // --- INTERNAL LOGIC ---

    fn recompute_all(&mut self) {
        let pairs = self.pair_names();
        for pair in pairs {
            self.recompute_pair(&pair);
        }
    }

    /// Recompute only if the rate limiter allows it.
    fn maybe_recompute(&mut self, pair: &str) {
        let min_gap_ms = self.config.min_recompute_interval_secs * 1000;
        let due = self
            .pairs
            .get(pair)
            .map(|s| TimeUtils::now_timestamp_ms() - s.last_recompute_ms >= min_gap_ms)
            .unwrap_or(false);
        if due {
            self.recompute_pair(pair);
        }
    }

    /// One full pass: evaluate, dedup signals, publish.
    fn recompute_pair(&mut self, pair: &str) {
        let params = *self.params_for(pair);
        let Some(state) = self.pairs.get_mut(pair) else {
            return;
        };

        let eval = crate::trace_time!(
            &format!("pass [{}]", pair),
            crate::config::SLOW_PASS_THRESHOLD_MICROS,
            { evaluate_series(&state.series, &params) }
        );

        let fresh: Vec<SignalEvent> = state.ledger.absorb(&eval.signals);

        #[cfg(debug_assertions)]
        for event in &fresh {
            log::info!("{}: {} @ {}", pair, event.side, event.time);
        }

        let snapshot = RegimeSnapshot {
            pair: pair.to_string(),
            computed_at_ms: TimeUtils::now_timestamp_ms(),
            candle_count: state.series.len(),
            zone: eval.current_zone(),
            baseline: eval.wave.baseline,
            wave: eval.wave.points,
            signals: eval.signals,
            fresh_signals: fresh,
        };

        // THE SWAP. Readers holding the old Arc keep a coherent old pass.
        state.snapshot = Some(Arc::new(snapshot));
        state.dirty = false;
        state.last_recompute_ms = TimeUtils::now_timestamp_ms();
        state.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SignalSide;
    use crate::config::ENGINE;
    use crate::domain::{Candle, CandleUpdate};

    /// Config with the rate limiter off, so every update recomputes.
    fn test_config(window_len: usize) -> EngineConfig {
        let mut config = ENGINE;
        config.min_recompute_interval_secs = 0;
        config.wave.window_len = window_len;
        config
    }

    fn closed_bar(pair: &str, i: i64, close: f64) -> CandleUpdate {
        CandleUpdate {
            pair: pair.to_string(),
            candle: Candle::new(i * 300, close, close, close, close),
            is_closed: true,
        }
    }

    /// Streams closed bars bar-by-bar, keeping its own time/price cursor
    /// so consecutive calls continue the same tape.
    struct Feeder {
        pair: &'static str,
        next_i: i64,
        price: f64,
    }

    impl Feeder {
        fn new(pair: &'static str) -> Self {
            Self {
                pair,
                next_i: 0,
                price: 100.0,
            }
        }

        fn segment(&mut self, engine: &mut RegimeEngine, bars: usize, step_pct: f64) {
            let factor = 1.0 + step_pct / 100.0;
            for _ in 0..bars {
                engine.ingest(&closed_bar(self.pair, self.next_i, self.price));
                self.price *= factor;
                self.next_i += 1;
            }
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ENGINE;
        config.wave.window_len = 2;
        assert!(RegimeEngine::new(config).is_err());
    }

    #[test]
    fn test_streaming_publishes_snapshots() {
        let mut engine = RegimeEngine::new(test_config(10)).unwrap();
        let mut feed = Feeder::new("BTCUSDT");

        feed.segment(&mut engine, 8, 0.5);
        // Under the data floor: a snapshot exists but carries nothing
        let snap = engine.snapshot("BTCUSDT").unwrap();
        assert!(snap.zone.is_none());
        assert!(snap.wave.is_empty());

        feed.segment(&mut engine, 20, 0.5);
        let snap = engine.snapshot("BTCUSDT").unwrap();
        assert_eq!(snap.candle_count, 28);
        assert_eq!(snap.zone, Some(Zone::Orange));
        assert_eq!(engine.current_zone("BTCUSDT"), Some(Zone::Orange));
        assert!(snap.baseline.is_some());
    }

    #[test]
    fn test_fresh_signals_surface_once() {
        let mut engine = RegimeEngine::new(test_config(10)).unwrap();
        let mut feed = Feeder::new("ETHUSDT");
        feed.segment(&mut engine, 30, 0.8);
        feed.segment(&mut engine, 30, -0.8);

        let snap = engine.snapshot("ETHUSDT").unwrap();
        assert_eq!(snap.signals.len(), 1);
        assert_eq!(snap.signals[0].side, SignalSide::Buy);

        // The flip surfaced as fresh exactly once across all the passes;
        // forcing another pass replays the same history silently.
        engine.force_recompute("ETHUSDT");
        let snap = engine.snapshot("ETHUSDT").unwrap();
        assert_eq!(snap.signals.len(), 1);
        assert!(snap.fresh_signals.is_empty());
    }

    #[test]
    fn test_open_bar_updates_rewrite_tail() {
        let mut engine = RegimeEngine::new(test_config(10)).unwrap();
        let mut feed = Feeder::new("BTCUSDT");
        feed.segment(&mut engine, 15, 0.2);

        let mut update = closed_bar("BTCUSDT", 15, 104.0);
        update.is_closed = false;
        engine.ingest(&update);
        engine.ingest(&CandleUpdate {
            candle: Candle::new(15 * 300, 104.0, 104.5, 103.0, 103.5),
            ..update.clone()
        });

        assert_eq!(engine.candle_count("BTCUSDT"), 16);
        let snap = engine.snapshot("BTCUSDT").unwrap();
        // Rate limiter is off in tests, so the open bar is already visible
        assert_eq!(snap.candle_count, 16);
    }

    #[test]
    fn test_param_change_rederives_consistent_history() {
        let mut engine = RegimeEngine::new(test_config(10)).unwrap();
        let mut feed = Feeder::new("BTCUSDT");
        feed.segment(&mut engine, 40, 0.8);
        feed.segment(&mut engine, 40, -0.8);

        let before = engine.snapshot("BTCUSDT").unwrap();
        assert!(!before.signals.is_empty());

        let mut params = *engine.params_for("BTCUSDT");
        params.window_len = 20;
        engine.set_params(params).unwrap();

        let after = engine.snapshot("BTCUSDT").unwrap();
        assert_eq!(after.candle_count, before.candle_count);
        // Re-derived wholesale under the new window
        assert_eq!(after.wave.len(), 80 - 19);
        for pair in after.signals.windows(2) {
            assert!(pair[0].time < pair[1].time);
            assert_ne!(pair[0].side, pair[1].side);
        }
    }

    #[test]
    fn test_override_wins_over_default() {
        let mut engine = RegimeEngine::new(test_config(10)).unwrap();
        Feeder::new("BTCUSDT").segment(&mut engine, 50, 0.3);
        Feeder::new("ETHUSDT").segment(&mut engine, 50, 0.3);

        let mut narrow = *engine.params_for("BTCUSDT");
        narrow.window_len = 25;
        engine.set_override("BTCUSDT", narrow).unwrap();

        assert_eq!(engine.snapshot("BTCUSDT").unwrap().wave.len(), 50 - 24);
        assert_eq!(engine.snapshot("ETHUSDT").unwrap().wave.len(), 50 - 9);
    }

    #[test]
    fn test_rate_limiter_defers_open_bar_passes() {
        let mut config = test_config(10);
        config.min_recompute_interval_secs = 3600; // force deferral
        let mut engine = RegimeEngine::new(config).unwrap();
        let mut feed = Feeder::new("BTCUSDT");

        feed.segment(&mut engine, 20, 0.5);

        // Closed bars always pass through the limiter
        engine.ingest(&closed_bar("BTCUSDT", 20, 111.0));
        let second = engine.snapshot("BTCUSDT").unwrap();
        assert_eq!(second.candle_count, 21);

        // An open-bar update is deferred: the published pass is unchanged
        let mut open = closed_bar("BTCUSDT", 21, 112.0);
        open.is_closed = false;
        engine.ingest(&open);
        engine.tick();
        let third = engine.snapshot("BTCUSDT").unwrap();
        assert_eq!(third.candle_count, 21);
        assert_eq!(engine.candle_count("BTCUSDT"), 22);
    }
}
