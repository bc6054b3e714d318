//! Uniform application of the aggregated warp.

use crate::phase::{PhaseState, PhaseVector};

/// Returns a new state with `warp` added to every entry.
///
/// The input is left untouched.
#[must_use]
pub fn apply_warp(state: &PhaseState, warp: PhaseVector) -> PhaseState {
    state.map(|entry| entry.wrapping_add(warp))
}
