//! The true-delivery loop.
//!
//! A run moves through a fixed sequence of [`Stage`]s:
//!
//! ```text
//! LOAD_PHASE_STATE -> EVAL_PLUGINS -> ACCUMULATE_WARP -> APPLY_WARP
//!   -> CHECK_SYMMETRY -> CHECK_ERROR -> DECIDE_TRUE_FALSE -> SEAL
//! ```
//!
//! Every stage depends on the one before it, so a run is strictly
//! sequential. Separate runs share nothing and may execute in parallel.
//!
//! [`evaluate`] covers the pure arithmetic stages (accumulate through
//! decide) over already-resolved plugin results. [`deliver`] drives the
//! whole loop: it polls the plugins, evaluates, and seals.
//!
//! # Example
//!
//! ```
//! use iso16_core::engine::evaluate;
//! use iso16_core::phase::PhaseState;
//!
//! let outcome = evaluate(&PhaseState::default(), &[]);
//! assert!(outcome.decision.true_delivery());
//! assert_eq!(outcome.warped, PhaseState::default());
//! ```

mod aggregate;
mod decision;
mod symmetry;
mod warp;

#[cfg(test)]
mod proptest_engine;

use std::fmt;

pub use aggregate::{Aggregator, WarpTotals, aggregate};
pub use decision::{Decision, check_error};
use serde::Serialize;
pub use symmetry::{Asymmetry, SYMMETRY_PAIRS, check_symmetry, first_asymmetry};
pub use warp::apply_warp;

use crate::phase::PhaseState;
use crate::plugin::{Plugin, PluginResult, resolve_all};
use crate::seal::{EncodingError, Seal, SealInput, SealMetadata, compute_seal};

/// Stages of the true-delivery loop, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// The initial phase state is accepted.
    LoadPhaseState,
    /// Plugins are resolved in input order.
    EvalPlugins,
    /// Plugin contributions are summed.
    AccumulateWarp,
    /// The warp total is added to every entry.
    ApplyWarp,
    /// Adjacent entries are compared.
    CheckSymmetry,
    /// Plugin status and error total are checked.
    CheckError,
    /// The verdicts are combined.
    #[serde(rename = "DECIDE_TRUE_FALSE")]
    Decide,
    /// The run is canonically encoded and hashed.
    Seal,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Self; 8] = [
        Self::LoadPhaseState,
        Self::EvalPlugins,
        Self::AccumulateWarp,
        Self::ApplyWarp,
        Self::CheckSymmetry,
        Self::CheckError,
        Self::Decide,
        Self::Seal,
    ];

    /// Stable upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LoadPhaseState => "LOAD_PHASE_STATE",
            Self::EvalPlugins => "EVAL_PLUGINS",
            Self::AccumulateWarp => "ACCUMULATE_WARP",
            Self::ApplyWarp => "APPLY_WARP",
            Self::CheckSymmetry => "CHECK_SYMMETRY",
            Self::CheckError => "CHECK_ERROR",
            Self::Decide => "DECIDE_TRUE_FALSE",
            Self::Seal => "SEAL",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Results of the arithmetic stages of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Aggregated plugin contributions.
    pub totals: WarpTotals,
    /// Phase state after the warp was applied.
    pub warped: PhaseState,
    /// Symmetry, error and delivery verdicts.
    pub decision: Decision,
    /// First adjacent pair outside tolerance, if any.
    pub asymmetry: Option<Asymmetry>,
}

/// A fully sealed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRun {
    /// Phase state the run started from.
    pub initial: PhaseState,
    /// Plugin results in the order they were resolved.
    pub results: Vec<PluginResult>,
    /// Arithmetic outcome.
    pub outcome: Outcome,
    /// Seal binding every input and output of the run.
    pub seal: Seal,
}

/// Runs the accumulate, apply, check and decide stages.
#[must_use]
pub fn evaluate(initial: &PhaseState, results: &[PluginResult]) -> Outcome {
    let totals = aggregate(results);
    tracing::debug!(
        stage = %Stage::AccumulateWarp,
        plugins = results.len(),
        warp = %totals.warp,
        error = %totals.error,
        all_ok = totals.all_ok
    );

    let warped = apply_warp(initial, totals.warp);
    tracing::debug!(stage = %Stage::ApplyWarp, first = %warped.entries()[0]);

    let asymmetry = first_asymmetry(&warped);
    let symmetry_ok = asymmetry.is_none();
    if let Some(found) = asymmetry {
        tracing::debug!(
            stage = %Stage::CheckSymmetry,
            index = found.index,
            axis = %found.axis,
            delta = %found.delta,
            "adjacent entries exceed epsilon"
        );
    } else {
        tracing::debug!(stage = %Stage::CheckSymmetry, symmetry_ok);
    }

    let error_ok = check_error(&totals);
    tracing::debug!(stage = %Stage::CheckError, error_ok);

    let decision = Decision::new(symmetry_ok, error_ok);
    tracing::debug!(
        stage = %Stage::Decide,
        true_delivery = decision.true_delivery()
    );

    Outcome {
        totals,
        warped,
        decision,
        asymmetry,
    }
}

/// Drives a complete run: resolve plugins, evaluate, seal.
///
/// # Errors
///
/// Returns [`EncodingError`] if a plugin identifier or version cannot be
/// canonically encoded. No seal is produced in that case.
pub fn deliver(
    initial: PhaseState,
    plugins: &mut [Box<dyn Plugin>],
    metadata: &SealMetadata,
) -> Result<DeliveryRun, EncodingError> {
    tracing::debug!(stage = %Stage::LoadPhaseState);

    let results = resolve_all(plugins);
    tracing::debug!(stage = %Stage::EvalPlugins, resolved = results.len());

    let outcome = evaluate(&initial, &results);

    let input = SealInput {
        initial: &initial,
        plugins: &results,
        totals: &outcome.totals,
        warped: &outcome.warped,
        decision: outcome.decision,
        metadata,
    };
    let seal = compute_seal(&input)?;
    tracing::debug!(stage = %Stage::Seal, seal = %seal);

    Ok(DeliveryRun {
        initial,
        results,
        outcome,
        seal,
    })
}
