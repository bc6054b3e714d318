//! Accumulation of plugin contributions into [`WarpTotals`].

use serde::Serialize;

use crate::fixed_point::Q16;
use crate::phase::PhaseVector;
use crate::plugin::PluginResult;

/// Sum of all plugin contributions for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WarpTotals {
    /// Component-wise sum of every plugin warp.
    pub warp: PhaseVector,
    /// Sum of every plugin error.
    pub error: Q16,
    /// `true` only if every plugin resolved with `OK`.
    pub all_ok: bool,
}

impl WarpTotals {
    /// Totals of an empty plugin set.
    pub const EMPTY: Self = Self {
        warp: PhaseVector::ZERO,
        error: Q16::ZERO,
        all_ok: true,
    };
}

impl Default for WarpTotals {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Running accumulator over plugin results.
///
/// Results are folded in the order they are pushed. A non-OK status clears
/// `all_ok` but never stops accumulation.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    totals: WarpTotals,
    accumulated: usize,
}

impl Aggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            totals: WarpTotals::EMPTY,
            accumulated: 0,
        }
    }

    /// Folds one plugin result into the totals.
    pub fn push(&mut self, result: &PluginResult) {
        self.totals.warp = self.totals.warp.wrapping_add(result.warp());
        self.totals.error = self.totals.error.wrapping_add(result.error());
        if !result.status().is_ok() {
            tracing::warn!(
                plugin = %result.id(),
                status = %result.status(),
                "plugin reported non-OK status"
            );
            self.totals.all_ok = false;
        }
        self.accumulated += 1;
    }

    /// Number of results folded so far.
    #[must_use]
    pub const fn accumulated(&self) -> usize {
        self.accumulated
    }

    /// Current totals.
    #[must_use]
    pub const fn totals(&self) -> WarpTotals {
        self.totals
    }
}

/// Aggregates `results` in order.
#[must_use]
pub fn aggregate(results: &[PluginResult]) -> WarpTotals {
    let mut aggregator = Aggregator::new();
    for result in results {
        aggregator.push(result);
    }
    aggregator.totals()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PluginDomain, PluginStatus};

    fn result(id: &str, warp: [i32; 3], error: i32, status: PluginStatus) -> PluginResult {
        PluginResult::new(
            id,
            PluginDomain::Custom,
            PhaseVector::from_raw(warp),
            Q16::from_raw(error),
            "1",
            status,
        )
    }

    #[test]
    fn empty_set_is_neutral() {
        assert_eq!(aggregate(&[]), WarpTotals::EMPTY);
        assert!(WarpTotals::default().all_ok);
    }

    #[test]
    fn sums_every_axis_and_error() {
        let totals = aggregate(&[
            result("a", [1, -2, 3], 4, PluginStatus::Ok),
            result("b", [10, 20, -30], -1, PluginStatus::Ok),
        ]);
        assert_eq!(totals.warp.to_raw(), [11, 18, -27]);
        assert_eq!(totals.error, Q16::from_raw(3));
        assert!(totals.all_ok);
    }

    #[test]
    fn non_ok_status_keeps_accumulating() {
        let mut aggregator = Aggregator::new();
        aggregator.push(&result("a", [1, 1, 1], 1, PluginStatus::Timeout));
        aggregator.push(&result("b", [2, 2, 2], 2, PluginStatus::Ok));
        let totals = aggregator.totals();
        assert_eq!(aggregator.accumulated(), 2);
        assert!(!totals.all_ok);
        assert_eq!(totals.warp.to_raw(), [3, 3, 3]);
        assert_eq!(totals.error, Q16::from_raw(3));
    }

    #[test]
    fn sums_wrap() {
        let totals = aggregate(&[
            result("a", [i32::MAX, 0, 0], i32::MAX, PluginStatus::Ok),
            result("b", [1, 0, 0], 1, PluginStatus::Ok),
        ]);
        assert_eq!(totals.warp.x, Q16::MIN);
        assert_eq!(totals.error, Q16::MIN);
    }
}
