//! Conformance checking: vectors, expected outputs, comparison and suites.
//!
//! [`check`] runs one vector against its expected output. [`suite`] runs
//! every vector in a directory.

pub mod compare;
pub mod suite;
pub mod vector;

use std::path::Path;

pub use compare::{Comparison, Field, Mismatch, compare};
use serde::Serialize;
pub use suite::{
    FailureReason, SuiteOptions, SuiteReport, VectorPair, VectorReport, discover, run_suite,
};
use thiserror::Error;
pub use vector::{
    ConformanceVector, ExpectedOutput, LoadError, MAX_VECTOR_FILE_SIZE, PluginDeclaration,
    PluginTable, load_expected, load_vector,
};

use crate::engine::DeliveryRun;
use crate::seal::{EncodingError, SealMetadata};

/// Errors that prevent a vector from producing a verdict.
#[derive(Debug, Error)]
pub enum ConformanceError {
    /// The vector or expected output failed to load.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The run could not be canonically encoded.
    #[error("cannot seal vector {vector_id}: {source}")]
    Encoding {
        /// Vector being run.
        vector_id: String,
        /// Encoding failure.
        #[source]
        source: EncodingError,
    },
}

/// A run together with its comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// Vector identifier.
    pub vector_id: String,
    /// The sealed run.
    pub run: DeliveryRun,
    /// Field-by-field comparison against the expected output.
    pub comparison: Comparison,
}

impl Verdict {
    /// Returns `true` if every field matched.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.comparison.is_match()
    }
}

/// Runs an already-loaded vector without comparing it.
///
/// # Errors
///
/// Returns [`ConformanceError::Encoding`] if the run cannot be sealed.
pub fn seal_vector(
    vector: &ConformanceVector,
    defaults: &SealMetadata,
) -> Result<DeliveryRun, ConformanceError> {
    vector
        .run(defaults)
        .map_err(|source| ConformanceError::Encoding {
            vector_id: vector.vector_id.clone(),
            source,
        })
}

/// Loads a vector and its expected output, runs it and compares.
///
/// # Errors
///
/// Returns [`ConformanceError`] if either file fails to load or the run
/// cannot be sealed. Field mismatches are not errors; they are reported in
/// the returned [`Verdict`].
pub fn check(
    vector_path: &Path,
    expected_path: &Path,
    defaults: &SealMetadata,
) -> Result<Verdict, ConformanceError> {
    let vector = load_vector(vector_path)?;
    let expected = load_expected(expected_path)?;
    let run = seal_vector(&vector, defaults)?;
    let comparison = compare(&vector.vector_id, &run, &expected);
    if comparison.is_match() {
        tracing::info!(vector = %vector.vector_id, "vector passed");
    } else {
        for mismatch in comparison.mismatches() {
            tracing::warn!(vector = %vector.vector_id, %mismatch, "field mismatch");
        }
    }
    Ok(Verdict {
        vector_id: vector.vector_id,
        run,
        comparison,
    })
}
