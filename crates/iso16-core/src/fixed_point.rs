//! Deterministic Q16.16 fixed-point arithmetic.
//!
//! A [`Q16`] is a signed 32-bit integer whose upper 16 bits hold the integer
//! part and whose lower 16 bits hold the fraction. Every operation in this
//! module is total and bit-exact on every platform:
//!
//! - Addition and subtraction wrap modulo 2^32 and reinterpret as signed.
//! - [`Q16::clamped_abs`] maps `Q16::MIN` to `Q16::MAX` because the true
//!   negation is unrepresentable.
//! - Comparison is a plain signed comparison of the raw values.
//!
//! No floating-point value is produced or consumed here.
//!
//! # Example
//!
//! ```
//! use iso16_core::fixed_point::Q16;
//!
//! let a = Q16::MAX;
//! let b = Q16::EPSILON;
//! assert_eq!(a.wrapping_add(b), Q16::MIN);
//! assert_eq!(Q16::MIN.clamped_abs(), Q16::MAX);
//! assert!(Q16::EPSILON.leq(Q16::EPSILON));
//! ```

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Number of fractional bits in the Q16.16 representation.
pub const FRACTIONAL_BITS: u32 = 16;

/// Size of a big-endian encoded [`Q16`] in bytes.
pub const Q16_ENCODED_LEN: usize = 4;

/// A Q16.16 fixed-point value stored as its raw two's-complement integer.
///
/// Serializes as the raw integer so conformance files carry exact bits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Q16(i32);

impl Q16 {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// The real value `1.0` (raw `0x0001_0000`).
    pub const ONE: Self = Self(1 << FRACTIONAL_BITS);

    /// The smallest representable positive step (raw `1`, i.e. 2^-16).
    ///
    /// This is the universal tolerance for the symmetry and error checks.
    pub const EPSILON: Self = Self(1);

    /// Most negative representable value.
    pub const MIN: Self = Self(i32::MIN);

    /// Most positive representable value.
    pub const MAX: Self = Self(i32::MAX);

    /// Wraps a raw Q16.16 integer.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Builds a value from a whole number (`value << 16`).
    #[must_use]
    pub const fn from_int(value: i16) -> Self {
        Self((value as i32) << FRACTIONAL_BITS)
    }

    /// Returns the raw two's-complement integer.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Adds two values, wrapping on overflow.
    #[must_use]
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    /// Subtracts `rhs` from `self`, wrapping on overflow.
    #[must_use]
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    /// Negates the value, wrapping `MIN` onto itself.
    #[must_use]
    pub const fn wrapping_neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }

    /// Absolute value with `abs(MIN) == MAX`.
    #[must_use]
    pub const fn clamped_abs(self) -> Self {
        if self.0 == i32::MIN {
            Self::MAX
        } else if self.0 < 0 {
            Self(-self.0)
        } else {
            self
        }
    }

    /// Returns `true` if `self <= rhs` as signed integers.
    #[must_use]
    pub const fn leq(self, rhs: Self) -> bool {
        self.0 <= rhs.0
    }

    /// Returns `true` if `self` is within [`Q16::EPSILON`].
    #[must_use]
    pub const fn within_epsilon(self) -> bool {
        self.leq(Self::EPSILON)
    }

    /// Big-endian encoding of the raw integer.
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; Q16_ENCODED_LEN] {
        self.0.to_be_bytes()
    }
}

impl From<i32> for Q16 {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<Q16> for i32 {
    fn from(value: Q16) -> Self {
        value.0
    }
}

impl Add for Q16 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
}

impl Sub for Q16 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }
}

impl Neg for Q16 {
    type Output = Self;

    fn neg(self) -> Self {
        self.wrapping_neg()
    }
}

impl fmt::Display for Q16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_at_max() {
        assert_eq!(Q16::MAX.wrapping_add(Q16::EPSILON), Q16::MIN);
        assert_eq!(Q16::MAX + Q16::MAX, Q16::from_raw(-2));
    }

    #[test]
    fn sub_wraps_at_min() {
        assert_eq!(Q16::MIN.wrapping_sub(Q16::EPSILON), Q16::MAX);
        assert_eq!(Q16::ZERO - Q16::MIN, Q16::MIN);
    }

    #[test]
    fn abs_clamps_min_to_max() {
        assert_eq!(Q16::MIN.clamped_abs(), Q16::MAX);
        assert_eq!(Q16::from_raw(-5).clamped_abs(), Q16::from_raw(5));
        assert_eq!(Q16::from_raw(7).clamped_abs(), Q16::from_raw(7));
        assert_eq!(Q16::ZERO.clamped_abs(), Q16::ZERO);
        assert_eq!(Q16::from_raw(-i32::MAX).clamped_abs(), Q16::MAX);
    }

    #[test]
    fn leq_is_signed() {
        assert!(Q16::MIN.leq(Q16::ZERO));
        assert!(Q16::from_raw(-1).leq(Q16::EPSILON));
        assert!(!Q16::from_raw(2).leq(Q16::EPSILON));
        assert!(Q16::EPSILON.within_epsilon());
        assert!(!Q16::from_raw(2).within_epsilon());
    }

    #[test]
    fn from_int_shifts_into_integer_part() {
        assert_eq!(Q16::from_int(1), Q16::ONE);
        assert_eq!(Q16::from_int(-1).raw(), -65_536);
        assert_eq!(Q16::from_int(i16::MAX).raw(), 0x7FFF_0000);
    }

    #[test]
    fn be_bytes_are_twos_complement() {
        assert_eq!(Q16::from_raw(1).to_be_bytes(), [0, 0, 0, 1]);
        assert_eq!(Q16::from_raw(-1).to_be_bytes(), [0xFF; 4]);
        assert_eq!(Q16::MIN.to_be_bytes(), [0x80, 0, 0, 0]);
        assert_eq!(Q16::ONE.to_be_bytes(), [0, 1, 0, 0]);
    }

    #[test]
    fn serde_uses_raw_integer() {
        let json = serde_json::to_string(&Q16::from_raw(-65_536)).unwrap();
        assert_eq!(json, "-65536");
        let back: Q16 = serde_json::from_str("2147483647").unwrap();
        assert_eq!(back, Q16::MAX);
        assert!(serde_json::from_str::<Q16>("2147483648").is_err());
        assert!(serde_json::from_str::<Q16>("1.5").is_err());
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn any_q16() -> impl Strategy<Value = Q16> {
            any::<i32>().prop_map(Q16::from_raw)
        }

        proptest! {
            #[test]
            fn add_is_commutative(a in any_q16(), b in any_q16()) {
                prop_assert_eq!(a.wrapping_add(b), b.wrapping_add(a));
            }

            #[test]
            fn add_is_associative(a in any_q16(), b in any_q16(), c in any_q16()) {
                prop_assert_eq!((a + b) + c, a + (b + c));
            }

            #[test]
            fn sub_is_antisymmetric(a in any_q16(), b in any_q16()) {
                prop_assert_eq!(a.wrapping_sub(b), -b.wrapping_sub(a));
            }

            #[test]
            fn sub_undoes_add(a in any_q16(), b in any_q16()) {
                prop_assert_eq!((a + b) - b, a);
            }

            #[test]
            fn abs_is_idempotent(a in any_q16()) {
                let once = a.clamped_abs();
                prop_assert_eq!(once.clamped_abs(), once);
                prop_assert!(Q16::ZERO.leq(once));
            }

            #[test]
            fn add_matches_wide_truncation(a in any::<i32>(), b in any::<i32>()) {
                #[allow(clippy::cast_possible_truncation)]
                let wide = (i64::from(a) + i64::from(b)) as i32;
                prop_assert_eq!(Q16::from_raw(a).wrapping_add(Q16::from_raw(b)).raw(), wide);
            }
        }
    }
}
