//! Conformance vectors and expected outputs.
//!
//! A vector is a JSON document:
//!
//! ```json
//! {
//!   "vector_id": "V001",
//!   "description": "free text",
//!   "initial_phase_state": [[0, 0, 0], "... 16 entries ..."],
//!   "plugins": {
//!     "P-A": {
//!       "id": "P-A", "domain": "Refraction", "warp_vector": [0, 0, 0],
//!       "error": 0, "version": "1.0.0", "status": "OK"
//!     }
//!   },
//!   "implementation_id": "optional",
//!   "timestamp": 0,
//!   "nonce": "optional, 32 hex characters"
//! }
//! ```
//!
//! Plugins are resolved in the order they appear in the `plugins` object.
//! Every key must equal the declared `id` and keys must be unique.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::engine::{DeliveryRun, deliver};
use crate::fixed_point::Q16;
use crate::phase::{PhaseState, PhaseVector};
use crate::plugin::{Plugin, PluginDomain, PluginManifest, PluginStatus, Resolution};
use crate::seal::{EncodingError, Nonce, Seal, SealMetadata, parse_nonce};

/// Maximum size of a vector or expected-output file (1 MiB).
pub const MAX_VECTOR_FILE_SIZE: u64 = 1024 * 1024;

/// Errors raised while loading a vector or expected-output file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file exceeds [`MAX_VECTOR_FILE_SIZE`].
    #[error("{} is {size} bytes, maximum is {max}", path.display())]
    TooLarge {
        /// File path.
        path: PathBuf,
        /// Actual size.
        size: u64,
        /// Size limit.
        max: u64,
    },

    /// The JSON is malformed or structurally invalid.
    #[error("invalid document {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Parser error, including line and column.
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Path of the file that failed to load.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::TooLarge { path, .. } | Self::Parse { path, .. } => path,
        }
    }
}

/// A plugin as declared by a vector.
///
/// Resolving a declaration returns exactly the declared warp, error and
/// status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginDeclaration {
    /// Plugin identifier; must equal its key in the `plugins` object.
    pub id: String,
    /// Functional category.
    pub domain: PluginDomain,
    /// Declared warp contribution.
    pub warp_vector: PhaseVector,
    /// Declared error contribution.
    pub error: Q16,
    /// Version string.
    pub version: String,
    /// Declared status.
    pub status: PluginStatus,
}

impl Plugin for PluginDeclaration {
    fn manifest(&self) -> PluginManifest {
        PluginManifest {
            id: self.id.clone(),
            domain: self.domain,
            version: self.version.clone(),
            status: self.status,
        }
    }

    fn resolve(&mut self) -> Resolution {
        Resolution {
            status: self.status,
            warp: self.warp_vector,
            error: self.error,
        }
    }
}

/// Ordered plugin declarations keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginTable(Vec<PluginDeclaration>);

impl PluginTable {
    /// Declarations in document order.
    #[must_use]
    pub fn declarations(&self) -> &[PluginDeclaration] {
        &self.0
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no plugins are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PluginTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for declaration in &self.0 {
            map.serialize_entry(&declaration.id, declaration)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PluginTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = PluginTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of plugin declarations keyed by id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PluginTable, A::Error> {
                let mut declarations: Vec<PluginDeclaration> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, declaration)) =
                    access.next_entry::<String, PluginDeclaration>()?
                {
                    if key != declaration.id {
                        return Err(serde::de::Error::custom(format!(
                            "plugin key {key:?} does not match declared id {:?}",
                            declaration.id
                        )));
                    }
                    if declarations.iter().any(|d| d.id == key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate plugin id {key:?}"
                        )));
                    }
                    declarations.push(declaration);
                }
                Ok(PluginTable(declarations))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

mod optional_nonce {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Nonce, parse_nonce};

    pub fn serialize<S: Serializer>(nonce: &Option<Nonce>, serializer: S) -> Result<S::Ok, S::Error> {
        match nonce {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Nonce>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| parse_nonce(&text).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// A conformance vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConformanceVector {
    /// Vector identifier.
    pub vector_id: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Exactly 16 initial entries.
    pub initial_phase_state: PhaseState,
    /// Plugin declarations in resolution order.
    #[serde(default)]
    pub plugins: PluginTable,
    /// Overrides the configured implementation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_id: Option<String>,
    /// Overrides the configured timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Overrides the configured nonce.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_nonce")]
    pub nonce: Option<Nonce>,
}

impl ConformanceVector {
    /// Parses a vector from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON, a phase state without
    /// exactly 16 entries, values outside the `i32` range, unknown statuses,
    /// mismatched or duplicate plugin keys, or a malformed nonce.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Fresh plugin instances for one run, in declaration order.
    #[must_use]
    pub fn plugins(&self) -> Vec<Box<dyn Plugin>> {
        self.plugins
            .declarations()
            .iter()
            .cloned()
            .map(|declaration| Box::new(declaration) as Box<dyn Plugin>)
            .collect()
    }

    /// Seal metadata with this vector's overrides applied to `defaults`.
    #[must_use]
    pub fn metadata(&self, defaults: &SealMetadata) -> SealMetadata {
        SealMetadata {
            implementation_id: self
                .implementation_id
                .clone()
                .unwrap_or_else(|| defaults.implementation_id.clone()),
            timestamp: self.timestamp.unwrap_or(defaults.timestamp),
            nonce: self.nonce.unwrap_or(defaults.nonce),
        }
    }

    /// Runs the full delivery loop over this vector.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if a plugin identifier or version exceeds
    /// the canonical length limit.
    pub fn run(&self, defaults: &SealMetadata) -> Result<DeliveryRun, EncodingError> {
        let metadata = self.metadata(defaults);
        let mut plugins = self.plugins();
        let run = deliver(self.initial_phase_state.clone(), &mut plugins, &metadata)?;
        tracing::info!(
            vector = %self.vector_id,
            true_delivery = run.outcome.decision.true_delivery(),
            seal = %run.seal,
            "delivery run complete"
        );
        if let Some(asymmetry) = run.outcome.asymmetry {
            tracing::info!(
                vector = %self.vector_id,
                pair = asymmetry.index,
                axis = %asymmetry.axis,
                delta = %asymmetry.delta,
                "symmetry check failed"
            );
        }
        Ok(run)
    }
}

/// Expected output of a vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedOutput {
    /// Vector this output belongs to, if stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_id: Option<String>,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Aggregated warp.
    pub warp_total: PhaseVector,
    /// Aggregated error.
    pub error_total: Q16,
    /// Exactly 16 warped entries.
    pub phase_state_warped: PhaseState,
    /// Symmetry verdict.
    pub symmetry_ok: bool,
    /// Error verdict.
    pub error_ok: bool,
    /// Final verdict.
    pub true_delivery: bool,
    /// Seal, 64 lowercase hex characters.
    pub tetra_seal: Seal,
}

impl ExpectedOutput {
    /// Parses an expected output from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON, a warped state without
    /// exactly 16 entries, or a seal that is not 64 lowercase hex characters.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Describes `run` as an expected output.
    #[must_use]
    pub fn from_run(vector_id: &str, run: &DeliveryRun) -> Self {
        let outcome = &run.outcome;
        Self {
            vector_id: Some(vector_id.to_string()),
            description: None,
            warp_total: outcome.totals.warp,
            error_total: outcome.totals.error,
            phase_state_warped: outcome.warped.clone(),
            symmetry_ok: outcome.decision.symmetry_ok(),
            error_ok: outcome.decision.error_ok(),
            true_delivery: outcome.decision.true_delivery(),
            tetra_seal: run.seal.clone(),
        }
    }
}

fn read_bounded(path: &Path) -> Result<String, LoadError> {
    let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() > MAX_VECTOR_FILE_SIZE {
        return Err(LoadError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: MAX_VECTOR_FILE_SIZE,
        });
    }
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and validates a vector file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read, is too large, or is
/// structurally invalid.
pub fn load_vector(path: &Path) -> Result<ConformanceVector, LoadError> {
    let text = read_bounded(path)?;
    let vector = ConformanceVector::from_json_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        vector = %vector.vector_id,
        plugins = vector.plugins.len(),
        "loaded vector"
    );
    Ok(vector)
}

/// Loads and validates an expected-output file.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read, is too large, or is
/// structurally invalid.
pub fn load_expected(path: &Path) -> Result<ExpectedOutput, LoadError> {
    let text = read_bounded(path)?;
    ExpectedOutput::from_json_str(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
