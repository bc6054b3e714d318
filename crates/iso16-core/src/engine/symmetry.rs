//! Adjacent-entry symmetry check.
//!
//! Entries are compared as a chain: index `i` against `i + 1` for
//! `i in 0..15`, fifteen comparisons in total. The last entry is not
//! compared back against the first.

use serde::Serialize;

use crate::fixed_point::Q16;
use crate::phase::{Axis, PHASE_ENTRIES, PhaseState};

/// Number of adjacent pairs compared.
pub const SYMMETRY_PAIRS: usize = PHASE_ENTRIES - 1;

/// First adjacent pair whose difference exceeds epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Asymmetry {
    /// Index of the first entry of the pair; the second is `index + 1`.
    pub index: usize,
    /// Axis that exceeded tolerance.
    pub axis: Axis,
    /// Clamped absolute difference on that axis.
    pub delta: Q16,
}

/// Finds the first pair and axis exceeding [`Q16::EPSILON`].
///
/// Pairs are scanned in index order and axes in `x, y, z` order.
#[must_use]
pub fn first_asymmetry(state: &PhaseState) -> Option<Asymmetry> {
    state
        .entries()
        .windows(2)
        .enumerate()
        .find_map(|(index, pair)| {
            let diff = pair[0].abs_diff(pair[1]);
            Axis::ALL.into_iter().find_map(|axis| {
                let delta = diff.axis(axis);
                (!delta.within_epsilon()).then_some(Asymmetry { index, axis, delta })
            })
        })
}

/// Returns `true` if all [`SYMMETRY_PAIRS`] adjacent pairs are within
/// epsilon on every axis.
#[must_use]
pub fn check_symmetry(state: &PhaseState) -> bool {
    first_asymmetry(state).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseVector;

    #[test]
    fn uniform_state_is_symmetric() {
        assert!(check_symmetry(&PhaseState::uniform(PhaseVector::from_raw([
            9, -9, 100
        ]))));
    }

    #[test]
    fn one_unit_steps_are_within_tolerance() {
        let mut entries = [PhaseVector::ZERO; PHASE_ENTRIES];
        for (i, entry) in entries.iter_mut().enumerate() {
            let raw = i32::try_from(i).unwrap();
            *entry = PhaseVector::from_raw([raw, -raw, 0]);
        }
        assert!(check_symmetry(&PhaseState::new(entries)));
    }

    #[test]
    fn two_unit_step_fails_on_that_pair() {
        let mut state = PhaseState::default();
        for i in 6..PHASE_ENTRIES {
            state = state.with_entry(i, PhaseVector::from_raw([0, 2, 0]));
        }
        assert!(!check_symmetry(&state));
        assert_eq!(
            first_asymmetry(&state),
            Some(Asymmetry {
                index: 5,
                axis: Axis::Y,
                delta: Q16::from_raw(2),
            })
        );
    }

    #[test]
    fn last_entry_is_not_compared_with_first() {
        let mut entries = [PhaseVector::ZERO; PHASE_ENTRIES];
        for (i, entry) in entries.iter_mut().enumerate() {
            let raw = i32::try_from(i).unwrap();
            *entry = PhaseVector::from_raw([raw, 0, 0]);
        }
        // 15 vs 0 differs by 15 units; a ring check would fail here.
        assert!(check_symmetry(&PhaseState::new(entries)));
        assert_eq!(SYMMETRY_PAIRS, 15);
    }

    #[test]
    fn wrapped_difference_uses_clamped_abs() {
        let state = PhaseState::default().with_entry(0, PhaseVector::from_raw([i32::MIN, 0, 0]));
        assert_eq!(
            first_asymmetry(&state),
            Some(Asymmetry {
                index: 0,
                axis: Axis::X,
                delta: Q16::MAX,
            })
        );
    }
}
