use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::config::PERSISTENCE;
use crate::domain::{BarInterval, CandleSeries};
use crate::utils::TimeUtils;

/// Binary cache file wrapper with metadata
#[derive(Serialize, Deserialize, Debug)]
struct CacheFile {
    pub version: f64,
    pub written_at_ms: i64,
    pub interval_secs: i64,
    pub series: Vec<CandleSeries>,
}

// Helper function to create a new file and any missing parent directories.
fn create_file_with_parents(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))
}

/// Write candle buffers to a binary cache file.
/// bincode is ~10-20x faster than JSON at these sizes.
pub fn write_series_cache(
    path: &Path,
    interval: BarInterval,
    series: &[CandleSeries],
) -> Result<()> {
    let file = create_file_with_parents(path)?;
    let writer = BufWriter::new(file);

    let cache = CacheFile {
        version: PERSISTENCE.candle.version,
        written_at_ms: TimeUtils::now_timestamp_ms(),
        interval_secs: interval.secs(),
        series: series.to_vec(),
    };

    bincode::serialize_into(writer, &cache)
        .with_context(|| format!("Failed to serialize cache to: {}", path.display()))?;

    let file_size = fs::metadata(path)?.len();
    log::info!(
        "cache written: {} ({:.1} KB, {} series)",
        path.display(),
        file_size as f64 / 1024.0,
        cache.series.len()
    );

    Ok(())
}

/// Read candle buffers back, rejecting stale formats and interval
/// mismatches up front so the engine never sees mixed-bucket data.
pub fn load_series_cache(path: &Path, expected: BarInterval) -> Result<Vec<CandleSeries>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let cache: CacheFile = bincode::deserialize_from(&mut reader)
        .with_context(|| format!("Failed to deserialize cache from: {}", path.display()))?;

    if cache.version != PERSISTENCE.candle.version {
        bail!(
            "Cache version mismatch: file v{} vs required v{}",
            cache.version,
            PERSISTENCE.candle.version
        );
    }

    if cache.interval_secs != expected.secs() {
        bail!(
            "Cache interval mismatch: file has {}s buckets, expected {}s",
            cache.interval_secs,
            expected.secs()
        );
    }

    log::info!(
        "cache loaded: {} series from {}",
        cache.series.len(),
        path.display()
    );

    Ok(cache.series)
}
