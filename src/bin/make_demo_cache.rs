//! Builds the deterministic demo candle cache so the CLI has something to
//! chew on without any network access. Re-running always produces the same
//! bars (only the written-at stamp changes).

use anyhow::Result;

use zone_radar::config::{DEMO, ENGINE, default_cache_path};
use zone_radar::data::{synth_series, write_series_cache};

fn main() -> Result<()> {
    // 1. Setup Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let interval = ENGINE.interval;
    let path = default_cache_path(interval);

    log::info!(
        "building demo cache: {} pairs x {} bars @ {}",
        DEMO.pairs.len(),
        DEMO.bars,
        interval
    );

    // 2. Synthesize every configured pair
    let series: Vec<_> = DEMO
        .pairs
        .iter()
        .map(|(pair, shape)| {
            log::info!("  {} ({})", pair, interval);
            synth_series(pair, interval, DEMO.start_time, DEMO.bars, shape)
        })
        .collect();

    // 3. Write the cache
    write_series_cache(&path, interval, &series)?;
    log::info!("done: {}", path.display());

    Ok(())
}
