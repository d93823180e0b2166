mod cache;
mod demo;

pub use cache::{load_series_cache, write_series_cache};
pub use demo::synth_series;
