use chrono::{DateTime, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const SEC_IN_MIN: i64 = 60;
    pub const SEC_IN_H: i64 = Self::SEC_IN_MIN * 60;
    pub const SEC_IN_D: i64 = Self::SEC_IN_H * 24;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn now_timestamp_ms() -> i64 {
        Utc::now().timestamp_millis()
    }
}

// Time Helper functions

/// Display helper for bar timestamps.
pub fn epoch_sec_to_utc(epoch_sec: i64) -> String {
    match DateTime::from_timestamp(epoch_sec, 0) {
        Some(dt) => format!("{}", dt.format(TimeUtils::STANDARD_TIME_FORMAT)),
        None => format!("invalid({})", epoch_sec),
    }
}

pub fn format_duration_secs(secs: i64) -> String {
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }
    let days = hours / 24;
    format!("{}d", days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_sec_to_utc() {
        assert_eq!(epoch_sec_to_utc(1_735_689_600), "2025-01-01 00:00");
    }

    #[test]
    fn test_format_duration_secs() {
        assert_eq!(format_duration_secs(45), "45s");
        assert_eq!(format_duration_secs(300), "5m");
        assert_eq!(format_duration_secs(7200), "2h");
        assert_eq!(format_duration_secs(172_800), "2d");
    }
}
