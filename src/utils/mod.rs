mod perf;
mod time_utils;

pub use time_utils::TimeUtils;
pub use time_utils::{epoch_sec_to_utc, format_duration_secs};
