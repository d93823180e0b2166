//! Configuration module for the zone-radar engine.

// Can all be private now because we have a public re-export.
mod debug;
mod demo;
mod persistence;
mod types;
mod wave;

// Re-export commonly used items
pub use debug::{LOG_PERFORMANCE, SLOW_PASS_THRESHOLD_MICROS};
pub use demo::{DEMO, DemoConfig, DemoShape};
pub use persistence::{PERSISTENCE, cache_filename, default_cache_path};
pub use types::{ClosePrice, HighPrice, LowPrice, OpenPrice, Price, PriceLike};
pub use wave::{
    DEFAULT_SCALE, DEFAULT_WINDOW_LEN, ENGINE, EngineConfig, HysteresisThresholds, SmoothingParams,
    TrendFilterParams, WaveParams,
};
