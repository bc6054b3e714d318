//! Phase vectors and the fixed 16-entry phase state.
//!
//! A [`PhaseState`] always holds exactly [`PHASE_ENTRIES`] entries. The
//! length is enforced by the type (`[PhaseVector; 16]`), so a wrong entry
//! count can only surface while converting from untrusted input, where it is
//! reported as [`PhaseError::WrongEntryCount`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fixed_point::Q16;

/// Number of entries in a phase state.
pub const PHASE_ENTRIES: usize = 16;

/// Number of axes per phase vector.
pub const AXES: usize = 3;

/// Errors raised while building a [`PhaseState`] from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    /// The input did not contain exactly [`PHASE_ENTRIES`] entries.
    #[error("phase state must have {expected} entries, got {actual}")]
    WrongEntryCount {
        /// Required entry count.
        expected: usize,
        /// Entry count found in the input.
        actual: usize,
    },
}

/// One of the three axes of a [`PhaseVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// First component.
    X,
    /// Second component.
    Y,
    /// Third component.
    Z,
}

impl Axis {
    /// All axes in encoding order.
    pub const ALL: [Self; AXES] = [Self::X, Self::Y, Self::Z];
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// A 3-axis Q16.16 vector.
///
/// Serializes as a `[x, y, z]` array of raw integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[Q16; 3]", into = "[Q16; 3]")]
pub struct PhaseVector {
    /// X component.
    pub x: Q16,
    /// Y component.
    pub y: Q16,
    /// Z component.
    pub z: Q16,
}

impl PhaseVector {
    /// The zero vector.
    pub const ZERO: Self = Self::new(Q16::ZERO, Q16::ZERO, Q16::ZERO);

    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: Q16, y: Q16, z: Q16) -> Self {
        Self { x, y, z }
    }

    /// Creates a vector from raw Q16.16 integers.
    #[must_use]
    pub const fn from_raw(raw: [i32; AXES]) -> Self {
        Self::new(Q16::from_raw(raw[0]), Q16::from_raw(raw[1]), Q16::from_raw(raw[2]))
    }

    /// Returns the raw Q16.16 integers.
    #[must_use]
    pub const fn to_raw(self) -> [i32; AXES] {
        [self.x.raw(), self.y.raw(), self.z.raw()]
    }

    /// Returns the component on `axis`.
    #[must_use]
    pub const fn axis(self, axis: Axis) -> Q16 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Component-wise wrapping addition.
    #[must_use]
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_add(rhs.x),
            self.y.wrapping_add(rhs.y),
            self.z.wrapping_add(rhs.z),
        )
    }

    /// Component-wise `abs(self - rhs)` using the clamped absolute value.
    #[must_use]
    pub const fn abs_diff(self, rhs: Self) -> Self {
        Self::new(
            self.x.wrapping_sub(rhs.x).clamped_abs(),
            self.y.wrapping_sub(rhs.y).clamped_abs(),
            self.z.wrapping_sub(rhs.z).clamped_abs(),
        )
    }
}

impl From<[Q16; AXES]> for PhaseVector {
    fn from([x, y, z]: [Q16; AXES]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<PhaseVector> for [Q16; AXES] {
    fn from(v: PhaseVector) -> Self {
        [v.x, v.y, v.z]
    }
}

impl fmt::Display for PhaseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// Exactly [`PHASE_ENTRIES`] phase vectors in index order.
///
/// Serializes as a JSON array of 16 `[x, y, z]` arrays; deserialization
/// rejects any other length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<PhaseVector>", into = "Vec<PhaseVector>")]
pub struct PhaseState([PhaseVector; PHASE_ENTRIES]);

impl PhaseState {
    /// Wraps a fixed array of entries.
    #[must_use]
    pub const fn new(entries: [PhaseVector; PHASE_ENTRIES]) -> Self {
        Self(entries)
    }

    /// A state where every entry equals `entry`.
    #[must_use]
    pub const fn uniform(entry: PhaseVector) -> Self {
        Self([entry; PHASE_ENTRIES])
    }

    /// Builds a state from a slice, enforcing the entry count.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::WrongEntryCount`] unless the slice has exactly
    /// [`PHASE_ENTRIES`] elements.
    pub fn from_slice(entries: &[PhaseVector]) -> Result<Self, PhaseError> {
        let fixed: [PhaseVector; PHASE_ENTRIES] =
            entries.try_into().map_err(|_| PhaseError::WrongEntryCount {
                expected: PHASE_ENTRIES,
                actual: entries.len(),
            })?;
        Ok(Self(fixed))
    }

    /// Returns the entries in index order.
    #[must_use]
    pub const fn entries(&self) -> &[PhaseVector; PHASE_ENTRIES] {
        &self.0
    }

    /// Returns the entry at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<PhaseVector> {
        self.0.get(index).copied()
    }

    /// Iterates over the entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &PhaseVector> {
        self.0.iter()
    }

    /// Returns a new state with `f` applied to every entry.
    #[must_use]
    pub fn map(&self, f: impl FnMut(PhaseVector) -> PhaseVector) -> Self {
        Self(self.0.map(f))
    }

    /// Returns a copy with the entry at `index` replaced.
    ///
    /// Out-of-range indices leave the state unchanged.
    #[must_use]
    pub fn with_entry(&self, index: usize, entry: PhaseVector) -> Self {
        let mut entries = self.0;
        if let Some(slot) = entries.get_mut(index) {
            *slot = entry;
        }
        Self(entries)
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::uniform(PhaseVector::ZERO)
    }
}

impl TryFrom<Vec<PhaseVector>> for PhaseState {
    type Error = PhaseError;

    fn try_from(entries: Vec<PhaseVector>) -> Result<Self, Self::Error> {
        Self::from_slice(&entries)
    }
}

impl From<PhaseState> for Vec<PhaseVector> {
    fn from(state: PhaseState) -> Self {
        state.0.to_vec()
    }
}
