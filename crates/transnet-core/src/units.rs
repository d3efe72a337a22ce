//! Unit newtypes for physical quantities parsed from tags.
//!
//! OSM-style tags store power as free text in SI base units
//! (`plant:output:electricity=850 MW`). Parsed values are wrapped so a nominal
//! power is never mistaken for a bare number.
//!
//! ```
//! use transnet_core::units::Watts;
//!
//! let p = Watts(850.0e6);
//! assert_eq!(p.to_megawatts(), 850.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Check if value is zero
            #[inline]
            pub fn is_zero(self) -> bool {
                self.0 == 0.0
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Power in watts, as written in generator/plant output tags.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Watts(pub f64);

impl_unit_ops!(Watts, "W");

impl Watts {
    #[inline]
    pub fn to_megawatts(self) -> f64 {
        self.0 / 1.0e6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_watts_arithmetic() {
        let total: Watts = [Watts(1.0e6), Watts(2.5e6)].into_iter().sum();
        assert_relative_eq!(total.to_megawatts(), 3.5);
        assert_relative_eq!((total - Watts(0.5e6)).value(), 3.0e6);
    }

    #[test]
    fn test_display_includes_unit() {
        assert_eq!(Watts(400.0).to_string(), "400 W");
        assert!(Watts::default().is_zero());
    }
}
