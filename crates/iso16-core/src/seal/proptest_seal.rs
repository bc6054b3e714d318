//! Property-based tests for canonical encoding and sealing.

use proptest::prelude::*;

use super::encoding::PHASE_STATE_ENCODED_LEN;
use super::{NONCE_LEN, SealInput, SealMetadata, compute_seal, encode};
use crate::engine::evaluate;
use crate::fixed_point::Q16;
use crate::phase::{PHASE_ENTRIES, PhaseState, PhaseVector};
use crate::plugin::{PluginDomain, PluginResult, PluginStatus};

fn state_strategy() -> impl Strategy<Value = PhaseState> {
    prop::collection::vec(any::<[i32; 3]>(), PHASE_ENTRIES).prop_map(|raw| {
        let entries: Vec<PhaseVector> = raw.into_iter().map(PhaseVector::from_raw).collect();
        PhaseState::from_slice(&entries).unwrap_or_default()
    })
}

fn domain_strategy() -> impl Strategy<Value = PluginDomain> {
    prop_oneof![
        Just(PluginDomain::Refraction),
        Just(PluginDomain::FrameDrag),
        Just(PluginDomain::Jitter),
        Just(PluginDomain::Custom),
    ]
}

fn result_strategy() -> impl Strategy<Value = PluginResult> {
    (
        "[a-zA-Z0-9_-]{0,12}",
        domain_strategy(),
        any::<[i32; 3]>(),
        any::<i32>(),
        "[0-9]\\.[0-9]",
        prop_oneof![Just(PluginStatus::Ok), Just(PluginStatus::OutOfRange)],
    )
        .prop_map(|(id, domain, warp, error, version, status)| {
            PluginResult::new(
                id,
                domain,
                PhaseVector::from_raw(warp),
                Q16::from_raw(error),
                version,
                status,
            )
        })
}

fn metadata_strategy() -> impl Strategy<Value = SealMetadata> {
    ("[ -~]{0,16}", any::<u64>(), any::<[u8; NONCE_LEN]>()).prop_map(
        |(implementation_id, timestamp, nonce)| SealMetadata {
            implementation_id,
            timestamp,
            nonce,
        },
    )
}

fn encode_run(initial: &PhaseState, plugins: &[PluginResult], meta: &SealMetadata) -> Vec<u8> {
    let outcome = evaluate(initial, plugins);
    let input = SealInput {
        initial,
        plugins,
        totals: &outcome.totals,
        warped: &outcome.warped,
        decision: outcome.decision,
        metadata: meta,
    };
    encode(&input).unwrap_or_default()
}

proptest! {
    /// Property: plugin input order never changes the canonical bytes.
    #[test]
    fn prop_encoding_ignores_plugin_order(
        initial in state_strategy(),
        (original, shuffled) in prop::collection::vec(result_strategy(), 0..6)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        meta in metadata_strategy(),
    ) {
        prop_assert_eq!(
            encode_run(&initial, &original, &meta),
            encode_run(&initial, &shuffled, &meta)
        );
    }

    /// Property: encoding length is determined by the variable-length fields.
    #[test]
    fn prop_encoding_length(
        initial in state_strategy(),
        plugins in prop::collection::vec(result_strategy(), 0..6),
        meta in metadata_strategy(),
    ) {
        let records: usize = plugins
            .iter()
            .map(|p| 2 + p.id().len() + 1 + 16 + p.version().len())
            .sum();
        prop_assert_eq!(
            encode_run(&initial, &plugins, &meta).len(),
            2 * PHASE_STATE_ENCODED_LEN
                + records
                + 16
                + 3
                + meta.implementation_id.len()
                + 8
                + NONCE_LEN
        );
    }

    /// Property: flipping one bit of one initial entry changes the seal.
    #[test]
    fn prop_phase_bit_flip_changes_seal(
        initial in state_strategy(),
        index in 0..PHASE_ENTRIES,
        axis in 0usize..3,
        bit in 0u32..32,
    ) {
        let meta = SealMetadata::default();
        let seal = |state: &PhaseState| {
            let outcome = evaluate(state, &[]);
            compute_seal(&SealInput {
                initial: state,
                plugins: &[],
                totals: &outcome.totals,
                warped: &outcome.warped,
                decision: outcome.decision,
                metadata: &meta,
            })
        };

        let mut raw = initial.entries()[index].to_raw();
        raw[axis] ^= 1 << bit;
        let mutated = initial.with_entry(index, PhaseVector::from_raw(raw));

        prop_assert_ne!(seal(&initial).ok(), seal(&mutated).ok());
    }
}
