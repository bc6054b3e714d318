//! Directory-level conformance runs.
//!
//! Vectors are files named `V*.json` in the vectors directory, visited in
//! file-name order. Each is paired with `<stem>_expected.json` in the
//! expected directory. Files whose stem already ends in `_expected` are
//! skipped so both directories may be the same.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::compare::Mismatch;
use super::vector::LoadError;
use super::{ConformanceError, check};
use crate::seal::{Seal, SealMetadata};

const EXPECTED_SUFFIX: &str = "_expected";

/// Why a vector did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// At least one field differed.
    Mismatch,
    /// The vector or expected output failed to load.
    LoadError,
    /// No expected output exists for the vector.
    MissingExpected,
    /// The run could not be canonically encoded.
    EncodingError,
}

impl FailureReason {
    /// Stable snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mismatch => "mismatch",
            Self::LoadError => "load_error",
            Self::MissingExpected => "missing_expected",
            Self::EncodingError => "encoding_error",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vector file and the expected-output file it should be checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorPair {
    /// File stem, used as the vector name in reports.
    pub stem: String,
    /// Vector file.
    pub vector: PathBuf,
    /// Expected-output file, which may not exist.
    pub expected: PathBuf,
}

/// Result for one vector.
#[derive(Debug, Clone, Serialize)]
pub struct VectorReport {
    /// File stem, or the vector id once loaded.
    pub vector_id: String,
    /// `true` if every field matched.
    pub passed: bool,
    /// Failure category, absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Human-readable failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Field mismatches.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<Mismatch>,
    /// Seal computed for the vector, if it ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seal: Option<Seal>,
}

impl VectorReport {
    fn failed(vector_id: String, reason: FailureReason, detail: String) -> Self {
        Self {
            vector_id,
            passed: false,
            reason: Some(reason),
            detail: Some(detail),
            mismatches: Vec::new(),
            seal: None,
        }
    }
}

/// Suite settings.
#[derive(Debug, Clone, Default)]
pub struct SuiteOptions {
    /// Stop after the first failing vector.
    pub strict: bool,
    /// Seal metadata applied where a vector has no override.
    pub metadata: SealMetadata,
}

/// Summary of a suite run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    /// Vectors run.
    pub total: usize,
    /// Vectors that passed.
    pub passed: usize,
    /// Vectors that failed.
    pub failed: usize,
    /// `true` if strict mode stopped the run early.
    pub stopped_early: bool,
    /// Per-vector results in run order.
    pub vectors: Vec<VectorReport>,
}

impl SuiteReport {
    /// Returns `true` if at least one vector ran and none failed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.total > 0
    }

    fn record(&mut self, report: VectorReport) {
        self.total += 1;
        if report.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.vectors.push(report);
    }
}

/// Lists vector files in `vectors_dir` with their expected-output paths.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if `vectors_dir` cannot be read.
pub fn discover(vectors_dir: &Path, expected_dir: &Path) -> Result<Vec<VectorPair>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: vectors_dir.to_path_buf(),
        source,
    };
    let mut pairs = Vec::new();
    for entry in fs::read_dir(vectors_dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !stem.starts_with('V') || stem.ends_with(EXPECTED_SUFFIX) || !path.is_file() {
            continue;
        }
        pairs.push(VectorPair {
            stem: stem.to_string(),
            expected: expected_dir.join(format!("{stem}{EXPECTED_SUFFIX}.json")),
            vector: path,
        });
    }
    pairs.sort_by(|a, b| a.stem.cmp(&b.stem));
    Ok(pairs)
}

/// Runs one pair and reports the outcome.
#[must_use]
pub fn run_pair(pair: &VectorPair, metadata: &SealMetadata) -> VectorReport {
    if !pair.expected.is_file() {
        return VectorReport::failed(
            pair.stem.clone(),
            FailureReason::MissingExpected,
            format!("{} not found", pair.expected.display()),
        );
    }

    match check(&pair.vector, &pair.expected, metadata) {
        Ok(verdict) => VectorReport {
            passed: verdict.passed(),
            reason: (!verdict.passed()).then_some(FailureReason::Mismatch),
            detail: None,
            mismatches: verdict.comparison.mismatches().to_vec(),
            seal: Some(verdict.run.seal),
            vector_id: verdict.vector_id,
        },
        Err(ConformanceError::Load(err)) => {
            VectorReport::failed(pair.stem.clone(), FailureReason::LoadError, err.to_string())
        },
        Err(err @ ConformanceError::Encoding { .. }) => VectorReport::failed(
            pair.stem.clone(),
            FailureReason::EncodingError,
            err.to_string(),
        ),
    }
}

/// Runs every vector in `vectors_dir`.
///
/// A failing vector never aborts the suite unless `options.strict` is set.
///
/// # Errors
///
/// Returns [`LoadError::Io`] only if `vectors_dir` cannot be listed.
pub fn run_suite(
    vectors_dir: &Path,
    expected_dir: &Path,
    options: &SuiteOptions,
) -> Result<SuiteReport, LoadError> {
    let pairs = discover(vectors_dir, expected_dir)?;
    tracing::info!(vectors = pairs.len(), dir = %vectors_dir.display(), "running suite");

    let mut report = SuiteReport::default();
    for (i, pair) in pairs.iter().enumerate() {
        let vector = run_pair(pair, &options.metadata);
        let passed = vector.passed;
        if let Some(reason) = vector.reason {
            tracing::warn!(vector = %vector.vector_id, %reason, "vector failed");
        }
        report.record(vector);
        if options.strict && !passed {
            report.stopped_early = i + 1 < pairs.len();
            break;
        }
    }

    tracing::info!(
        total = report.total,
        passed = report.passed,
        failed = report.failed,
        "suite complete"
    );
    Ok(report)
}
