//! File persistence and serialization configuration

use std::path::PathBuf;

use crate::domain::BarInterval;

/// Configuration for Candle Data Persistence
pub struct CandlePersistenceConfig {
    /// Directory path for storing candle caches
    pub directory: &'static str,
    /// Base filename for candle cache files (without extension)
    pub filename_base: &'static str,
    /// Current version of the cache serialization format
    pub version: f64,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub candle: CandlePersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    candle: CandlePersistenceConfig {
        directory: "candle_data",
        filename_base: "cd",
        version: 1.0,
    },
};

/// Generate interval-specific cache filename
/// Example: "cd_5m_v1.bin"
pub fn cache_filename(interval: BarInterval) -> String {
    format!(
        "{}_{}_v{}.bin",
        PERSISTENCE.candle.filename_base,
        interval.as_str(),
        PERSISTENCE.candle.version
    )
}

/// Default on-disk location for the cache of a given interval.
pub fn default_cache_path(interval: BarInterval) -> PathBuf {
    PathBuf::from(PERSISTENCE.candle.directory).join(cache_filename(interval))
}
