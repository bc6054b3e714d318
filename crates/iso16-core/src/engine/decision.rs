//! Error tolerance check and the final delivery decision.

use serde::Serialize;

use super::aggregate::WarpTotals;

/// Returns `true` when every plugin reported OK and the accumulated error
/// is within epsilon.
///
/// Both conditions are required: a small error total never compensates for
/// a plugin that reported a non-OK status.
#[must_use]
pub const fn check_error(totals: &WarpTotals) -> bool {
    totals.all_ok && totals.error.within_epsilon()
}

/// Outcome of the symmetry and error checks.
///
/// `true_delivery` is always `symmetry_ok && error_ok`; the type offers no
/// way to construct any other combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Decision {
    symmetry_ok: bool,
    error_ok: bool,
    true_delivery: bool,
}

impl Decision {
    /// Combines the two verdicts.
    #[must_use]
    pub const fn new(symmetry_ok: bool, error_ok: bool) -> Self {
        Self {
            symmetry_ok,
            error_ok,
            true_delivery: symmetry_ok && error_ok,
        }
    }

    /// Symmetry verdict.
    #[must_use]
    pub const fn symmetry_ok(&self) -> bool {
        self.symmetry_ok
    }

    /// Error verdict.
    #[must_use]
    pub const fn error_ok(&self) -> bool {
        self.error_ok
    }

    /// Final pass/fail verdict.
    #[must_use]
    pub const fn true_delivery(&self) -> bool {
        self.true_delivery
    }

    /// The three verdicts in canonical encoding order.
    #[must_use]
    pub const fn flags(&self) -> [bool; 3] {
        [self.symmetry_ok, self.error_ok, self.true_delivery]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed_point::Q16;
    use crate::phase::PhaseVector;

    fn totals(error: i32, all_ok: bool) -> WarpTotals {
        WarpTotals {
            warp: PhaseVector::ZERO,
            error: Q16::from_raw(error),
            all_ok,
        }
    }

    #[test]
    fn error_within_epsilon_passes() {
        assert!(check_error(&totals(0, true)));
        assert!(check_error(&totals(1, true)));
        assert!(check_error(&totals(-500, true)));
        assert!(!check_error(&totals(2, true)));
    }

    #[test]
    fn non_ok_status_fails_closed() {
        assert!(!check_error(&totals(0, false)));
    }

    #[test]
    fn decision_is_conjunction() {
        assert_eq!(Decision::new(true, true).flags(), [true, true, true]);
        assert_eq!(Decision::new(true, false).flags(), [true, false, false]);
        assert_eq!(Decision::new(false, true).flags(), [false, true, false]);
        assert_eq!(Decision::new(false, false).flags(), [false, false, false]);
    }
}
