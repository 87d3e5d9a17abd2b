//! Rational numbers for play rates and display scales.

use std::fmt::Display;

use crate::consts::FIXED_ONE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Default for Rational {
    fn default() -> Self {
        Self::ONE
    }
}

impl Rational {
    pub const ONE: Self = Self { num: 1, den: 1 };
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// A zero denominator is treated as `1`.
    pub fn new(num: i64, den: i64) -> Self {
        match den {
            0 => Self { num, den: 1 },
            d if d < 0 => Self { num: -num, den: -d },
            d => Self { num, den: d },
        }
    }

    /// From a 16.16 fixed point value.
    pub fn from_fixed(value: i32) -> Self {
        Self::new(value as i64, FIXED_ONE as i64)
    }

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub fn is_positive(&self) -> bool {
        self.num > 0
    }

    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// `value * self`, truncated. `None` on overflow or negative result.
    pub fn scale(&self, value: u64) -> Option<u64> {
        let scaled = value as i128 * self.num as i128 / self.den as i128;
        u64::try_from(scaled).ok()
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

#[cfg(test)]
mod tests {
    use super::Rational;

    #[test]
    fn fixed_point_rate() {
        let half = Rational::from_fixed(0x8000);
        assert_eq!(half.as_f64(), 0.5);
        assert_eq!(half.scale(10), Some(5));
        assert_eq!(Rational::new(1, 0), Rational::ONE);
        assert_eq!(Rational::new(-1, 2).scale(10), None);
    }
}
