//! Domain scalar newtypes (Immutable Blueprints)

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// A behavioral contract for anything that behaves like a price.
pub trait PriceLike {
    fn value(&self) -> f64;

    const MIN_EPSILON: f64 = 1e-12;

    fn is_positive(&self) -> bool {
        self.value() > Self::MIN_EPSILON
    }

    /// Formats a price with "Trader Precision" adaptive decimals.
    fn format_price(&self) -> String {
        let price = self.value();
        if price == 0.0 {
            return "$0.00".to_string();
        }

        // Determine magnitude
        let abs_price = price.abs();

        if abs_price >= 1000.0 {
            format!("${:.2}", price)
        } else if abs_price >= 1.0 {
            format!("${:.4}", price)
        } else if abs_price >= 0.01 {
            format!("${:.5}", price)
        } else {
            format!("${:.8}", price)
        }
    }
}

macro_rules! impl_into_price {
    ($from:ident) => {
        impl From<$from> for Price {
            fn from(p: $from) -> Self {
                Price::new(p.value())
            }
        }
    };
}

macro_rules! define_price_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(f64);

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name::new(v)
            }
        }

        impl $name {
            pub const fn new(val: f64) -> Self {
                // Absolute prices should not be negative
                let v = if val < 0.0 { 0.0 } else { val };
                Self(v)
            }
        }

        impl Sub for $name {
            type Output = f64;

            fn sub(self, rhs: Self) -> Self::Output {
                self.value() - rhs.value()
            }
        }

        impl PriceLike for $name {
            fn value(&self) -> f64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.format_price())
            }
        }
    };
}

macro_rules! impl_price_compare {
    ($a:ty, $b:ty) => {
        impl PartialEq<$b> for $a {
            fn eq(&self, other: &$b) -> bool {
                self.value() == other.value()
            }
        }

        impl PartialOrd<$b> for $a {
            fn partial_cmp(&self, other: &$b) -> Option<std::cmp::Ordering> {
                self.value().partial_cmp(&other.value())
            }
        }
    };
}

// Generate the Price Hierarchy
define_price_type!(Price);
define_price_type!(OpenPrice);
define_price_type!(HighPrice);
define_price_type!(LowPrice);
define_price_type!(ClosePrice);

impl_into_price!(OpenPrice);
impl_into_price!(HighPrice);
impl_into_price!(LowPrice);
impl_into_price!(ClosePrice);

impl_price_compare!(LowPrice, HighPrice);
impl_price_compare!(HighPrice, LowPrice);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_prices_clamp_to_zero() {
        assert_eq!(Price::new(-5.0).value(), 0.0);
        assert_eq!(ClosePrice::from(-0.001).value(), 0.0);
    }

    #[test]
    fn test_cross_type_compare() {
        let high = HighPrice::new(105.0);
        let low = LowPrice::new(99.0);
        assert!(high > low);
        assert!(low < high);
    }

    #[test]
    fn test_sub_yields_raw_span() {
        let a = Price::new(105.0);
        let b = Price::new(99.0);
        assert_eq!(a - b, 6.0);
    }
}
