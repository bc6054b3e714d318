//! Field-by-field comparison of a run against its expected output.
//!
//! Values are compared exactly, as raw integers and strings. Tolerance only
//! applies inside the symmetry and error checks, never here.

use std::fmt;

use serde::Serialize;

use super::vector::ExpectedOutput;
use crate::engine::DeliveryRun;

/// A compared output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Vector identifier declared by the expected output.
    VectorId,
    /// Aggregated warp.
    WarpTotal,
    /// Aggregated error.
    ErrorTotal,
    /// Warped phase state.
    PhaseStateWarped,
    /// Symmetry verdict.
    SymmetryOk,
    /// Error verdict.
    ErrorOk,
    /// Final verdict.
    TrueDelivery,
    /// Seal.
    TetraSeal,
}

impl Field {
    /// JSON field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VectorId => "vector_id",
            Self::WarpTotal => "warp_total",
            Self::ErrorTotal => "error_total",
            Self::PhaseStateWarped => "phase_state_warped",
            Self::SymmetryOk => "symmetry_ok",
            Self::ErrorOk => "error_ok",
            Self::TrueDelivery => "true_delivery",
            Self::TetraSeal => "tetra_seal",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One differing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Which field differs.
    pub field: Field,
    /// Rendered expected value.
    pub expected: String,
    /// Rendered actual value.
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Result of comparing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Comparison {
    mismatches: Vec<Mismatch>,
}

impl Comparison {
    /// Returns `true` if every field matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Mismatches in field order.
    #[must_use]
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Names of the mismatched fields.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.mismatches.iter().map(|m| m.field)
    }

    fn check<T: PartialEq + ToString>(&mut self, field: Field, expected: &T, actual: &T) {
        if expected != actual {
            self.mismatches.push(Mismatch {
                field,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
    }
}

/// Compares `run` against `expected`.
///
/// `vector_id` is only checked when the expected output declares one. A
/// warped-state mismatch reports the first differing entry.
#[must_use]
pub fn compare(vector_id: &str, run: &DeliveryRun, expected: &ExpectedOutput) -> Comparison {
    let mut comparison = Comparison::default();
    let outcome = &run.outcome;

    if let Some(declared) = &expected.vector_id {
        comparison.check(Field::VectorId, declared, &vector_id.to_string());
    }
    comparison.check(Field::WarpTotal, &expected.warp_total, &outcome.totals.warp);
    comparison.check(Field::ErrorTotal, &expected.error_total, &outcome.totals.error);

    if let Some((index, (want, got))) = expected
        .phase_state_warped
        .iter()
        .zip(outcome.warped.iter())
        .enumerate()
        .find(|(_, (want, got))| want != got)
    {
        comparison.mismatches.push(Mismatch {
            field: Field::PhaseStateWarped,
            expected: format!("entry {index} = {want}"),
            actual: format!("entry {index} = {got}"),
        });
    }

    let decision = outcome.decision;
    comparison.check(Field::SymmetryOk, &expected.symmetry_ok, &decision.symmetry_ok());
    comparison.check(Field::ErrorOk, &expected.error_ok, &decision.error_ok());
    comparison.check(
        Field::TrueDelivery,
        &expected.true_delivery,
        &decision.true_delivery(),
    );
    comparison.check(Field::TetraSeal, &expected.tetra_seal, &run.seal);

    if !comparison.is_match() {
        tracing::debug!(
            vector = %vector_id,
            mismatched = comparison.mismatches.len(),
            "comparison failed"
        );
    }
    comparison
}
