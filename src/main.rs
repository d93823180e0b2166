use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tabled::{Table, Tabled, settings::Style};

use zone_radar::analysis::{RegimeEval, SignalSide, evaluate_series};
use zone_radar::config::{self, DEMO};
use zone_radar::data::{load_series_cache, synth_series};
use zone_radar::domain::{CandleSeries, CandleUpdate};
use zone_radar::engine::RegimeEngine;
use zone_radar::utils::{epoch_sec_to_utc, format_duration_secs};
use zone_radar::{Cli, WaveParams};

#[derive(Tabled)]
struct PairRow {
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Bars")]
    bars: usize,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Wave")]
    wave: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Buys")]
    buys: usize,
    #[tabled(rename = "Sells")]
    sells: usize,
    #[tabled(rename = "Last Signal")]
    last_signal: String,
}

fn pair_row(series: &CandleSeries, eval: &RegimeEval) -> PairRow {
    let buys = eval
        .signals
        .iter()
        .filter(|s| s.side == SignalSide::Buy)
        .count();
    let sells = eval.signals.len() - buys;

    let (wave, position) = match eval.wave.points.last() {
        Some(p) => (format!("{:.4}", p.value), format!("{:.3}", p.ratio)),
        None => ("-".to_string(), "-".to_string()),
    };

    PairRow {
        pair: series.pair.clone(),
        bars: series.len(),
        zone: eval
            .current_zone()
            .map(|z| z.to_string())
            .unwrap_or_else(|| "-".to_string()),
        wave,
        position,
        buys,
        sells,
        last_signal: eval
            .signals
            .last()
            .map(|s| {
                let age = series.last_time().unwrap_or(s.time) - s.time;
                format!(
                    "{} @ {} ({} ago)",
                    s.side,
                    epoch_sec_to_utc(s.time),
                    format_duration_secs(age)
                )
            })
            .unwrap_or_else(|| "-".to_string()),
    }
}

fn load_data(args: &Cli) -> Result<Vec<CandleSeries>> {
    if args.demo {
        log::info!("generating {} demo pairs in memory", DEMO.pairs.len());
        return Ok(DEMO
            .pairs
            .iter()
            .map(|(pair, shape)| {
                synth_series(pair, config::ENGINE.interval, DEMO.start_time, DEMO.bars, shape)
            })
            .collect());
    }

    let path = args
        .cache
        .clone()
        .unwrap_or_else(|| config::default_cache_path(config::ENGINE.interval));
    load_series_cache(&path, config::ENGINE.interval).with_context(|| {
        format!(
            "no usable cache at {} (run make_demo_cache first, or pass --demo)",
            path.display()
        )
    })
}

fn dump_signals_json(path: &std::path::Path, evals: &[(CandleSeries, RegimeEval)]) -> Result<()> {
    let by_pair: std::collections::BTreeMap<&str, &Vec<zone_radar::SignalEvent>> = evals
        .iter()
        .map(|(series, eval)| (series.pair.as_str(), &eval.signals))
        .collect();

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &by_pair)?;
    log::info!("signal history written to {}", path.display());
    Ok(())
}

/// Re-drive the tail of each series through the streaming engine, the way
/// a live host would, and print only the signals that surface as fresh.
fn run_replay(evals: &[(CandleSeries, RegimeEval)], params: WaveParams, tail: usize) -> Result<()> {
    let mut engine_config = config::ENGINE;
    engine_config.wave = params;
    let mut engine = RegimeEngine::new(engine_config)?;

    let mut updates: Vec<CandleUpdate> = Vec::new();
    for (series, _) in evals {
        let split = series.len().saturating_sub(tail);
        engine.register(series.truncated(split));
        for idx in split..series.len() {
            updates.push(CandleUpdate {
                pair: series.pair.clone(),
                candle: series.get_candle(idx),
                is_closed: true,
            });
        }
    }

    // Settle the ledgers on the withheld-prefix history first, so the
    // stream below surfaces only what a live listener would see.
    engine.tick();

    println!("\nReplaying last {} bars per pair:", tail);
    updates.sort_by_key(|u| u.candle.time);
    for update in &updates {
        engine.ingest(update);
        if let Some(snap) = engine.snapshot(&update.pair) {
            for event in &snap.fresh_signals {
                println!(
                    "  {} {} @ {} (zone now {})",
                    update.pair,
                    event.side,
                    epoch_sec_to_utc(event.time),
                    snap.zone.map(|z| z.to_string()).unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

#[cfg(feature = "backtest")]
fn run_backtests(evals: &[(CandleSeries, RegimeEval)], params: WaveParams) {
    use zone_radar::engine::{BacktestConfig, run_backtest};

    #[derive(Tabled)]
    struct BacktestRow {
        #[tabled(rename = "Pair")]
        pair: String,
        #[tabled(rename = "Signals")]
        signals: usize,
        #[tabled(rename = "Trades")]
        trades: usize,
        #[tabled(rename = "Wins")]
        wins: usize,
        #[tabled(rename = "Win Rate")]
        win_rate: String,
        #[tabled(rename = "Avg PnL")]
        avg_pnl: String,
    }

    let config = BacktestConfig {
        params,
        ..BacktestConfig::default()
    };

    let rows: Vec<BacktestRow> = evals
        .par_iter()
        .map(|(series, _)| {
            let report = run_backtest(series, &config);
            BacktestRow {
                pair: report.pair.clone(),
                signals: report.signals_replayed,
                trades: report.trades.len(),
                wins: report.wins,
                win_rate: format!("{:.1}%", report.win_rate * 100.0),
                avg_pnl: format!("{:+.3}%", report.avg_pnl * 100.0),
            }
        })
        .collect();

    println!("\nBacktest (hold-out {} bars):", config.holdout_candles);
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

fn main() -> Result<()> {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Warn, log::LevelFilter::Warn)
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, global_level)
        .filter(Some("zone_radar"), my_code_level)
        .parse_default_env()
        .init();

    let args = Cli::parse();

    let params = args.wave_params();
    params.validate()?;

    let data = load_data(&args)?;
    if data.is_empty() {
        log::warn!("no candle series found, nothing to do");
        return Ok(());
    }

    // Pure per-pair work: fan out
    let evals: Vec<(CandleSeries, RegimeEval)> = data
        .into_par_iter()
        .map(|series| {
            let eval = evaluate_series(&series, &params);
            (series, eval)
        })
        .collect();

    let rows: Vec<PairRow> = evals.iter().map(|(s, e)| pair_row(s, e)).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");

    if let Some(path) = &args.signals_json {
        dump_signals_json(path, &evals)?;
    }

    if args.replay > 0 {
        run_replay(&evals, params, args.replay)?;
    }

    #[cfg(feature = "backtest")]
    if args.backtest {
        run_backtests(&evals, params);
    }

    Ok(())
}
