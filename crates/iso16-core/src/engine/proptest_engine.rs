//! Property-based tests for the delivery loop.
//!
//! These tests check that aggregation ignores plugin order, that a uniform
//! warp never changes the symmetry verdict, and that the decision is always
//! the conjunction of its two checks.

use proptest::prelude::*;

use super::{aggregate, apply_warp, check_symmetry, evaluate};
use crate::fixed_point::Q16;
use crate::phase::{PHASE_ENTRIES, PhaseState, PhaseVector};
use crate::plugin::{PluginDomain, PluginResult, PluginStatus};

fn vector_strategy() -> impl Strategy<Value = PhaseVector> {
    any::<[i32; 3]>().prop_map(PhaseVector::from_raw)
}

/// Mostly near-uniform states so both symmetry verdicts show up.
fn state_strategy() -> impl Strategy<Value = PhaseState> {
    (vector_strategy(), prop::collection::vec(-2i32..=2, PHASE_ENTRIES)).prop_map(
        |(base, steps)| {
            let mut entries = [base; PHASE_ENTRIES];
            let mut drift = 0i32;
            for (entry, step) in entries.iter_mut().zip(steps) {
                drift += step;
                *entry = base.wrapping_add(PhaseVector::from_raw([drift, 0, -drift]));
            }
            PhaseState::new(entries)
        },
    )
}

fn status_strategy() -> impl Strategy<Value = PluginStatus> {
    prop_oneof![
        4 => Just(PluginStatus::Ok),
        1 => Just(PluginStatus::InsufficientData),
        1 => Just(PluginStatus::OutOfRange),
        1 => Just(PluginStatus::Timeout),
        1 => Just(PluginStatus::SensorMismatch),
    ]
}

fn result_strategy() -> impl Strategy<Value = PluginResult> {
    ("[A-Z]-[a-z]{1,6}", vector_strategy(), -3i32..=3, status_strategy()).prop_map(
        |(id, warp, error, status)| {
            PluginResult::new(
                id,
                PluginDomain::Jitter,
                warp,
                Q16::from_raw(error),
                "0.1.0",
                status,
            )
        },
    )
}

/// A result set together with a shuffled copy of it.
fn permuted_results() -> impl Strategy<Value = (Vec<PluginResult>, Vec<PluginResult>)> {
    prop::collection::vec(result_strategy(), 0..8)
        .prop_flat_map(|results| (Just(results.clone()), Just(results).prop_shuffle()))
}

proptest! {
    /// Property: permuting plugin results leaves the totals unchanged.
    #[test]
    fn prop_aggregation_is_order_independent((original, shuffled) in permuted_results()) {
        prop_assert_eq!(aggregate(&original), aggregate(&shuffled));
    }

    /// Property: a uniform warp preserves every adjacent difference.
    #[test]
    fn prop_warp_preserves_symmetry_verdict(
        state in state_strategy(),
        warp in vector_strategy(),
    ) {
        prop_assert_eq!(
            check_symmetry(&apply_warp(&state, warp)),
            check_symmetry(&state)
        );
    }

    /// Property: true delivery is exactly symmetry AND error.
    #[test]
    fn prop_decision_is_conjunction(
        state in state_strategy(),
        results in prop::collection::vec(result_strategy(), 0..5),
    ) {
        let outcome = evaluate(&state, &results);
        let decision = outcome.decision;
        prop_assert_eq!(
            decision.true_delivery(),
            decision.symmetry_ok() && decision.error_ok()
        );
        prop_assert_eq!(decision.symmetry_ok(), outcome.asymmetry.is_none());
        if results.iter().any(|r| !r.status().is_ok()) {
            prop_assert!(!decision.error_ok());
        }
    }
}
