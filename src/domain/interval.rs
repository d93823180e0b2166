use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum_macros::EnumIter;

use crate::utils::TimeUtils;

/// Supported candle bucket widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Default)]
pub enum BarInterval {
    M1,
    M3,
    #[default]
    M5,
    M10,
    M15,
    M30,
    H1,
    D1,
}

impl BarInterval {
    pub const fn secs(&self) -> i64 {
        match self {
            Self::M1 => TimeUtils::SEC_IN_MIN,
            Self::M3 => TimeUtils::SEC_IN_MIN * 3,
            Self::M5 => TimeUtils::SEC_IN_MIN * 5,
            Self::M10 => TimeUtils::SEC_IN_MIN * 10,
            Self::M15 => TimeUtils::SEC_IN_MIN * 15,
            Self::M30 => TimeUtils::SEC_IN_MIN * 30,
            Self::H1 => TimeUtils::SEC_IN_H,
            Self::D1 => TimeUtils::SEC_IN_D,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.secs() as u64)
    }

    /// Start of the bucket containing `ts` (epoch seconds).
    pub fn bucket_start(&self, ts: i64) -> i64 {
        ts - ts.rem_euclid(self.secs())
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M3 => "3m",
            Self::M5 => "5m",
            Self::M10 => "10m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::D1 => "1d",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|i| i.as_str() == text)
    }
}

impl std::fmt::Display for BarInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<BarInterval> for Duration {
    fn from(interval: BarInterval) -> Self {
        interval.duration()
    }
}
