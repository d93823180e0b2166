//! Debug and performance-tracing switches

/// Master switch for the `trace_time!` macro.
/// Leave off in normal builds; the engine pass is hot.
pub const LOG_PERFORMANCE: bool = false;

/// Warn threshold (microseconds) for one full recompute pass.
pub const SLOW_PASS_THRESHOLD_MICROS: u128 = 50_000;
