//! Plugin capability and the results plugins contribute to a run.
//!
//! Plugins are opaque to the core. A plugin answers two questions:
//!
//! - [`Plugin::manifest`]: who it is (identifier, domain, version, declared
//!   status).
//! - [`Plugin::resolve`]: what it contributes this run (status code, warp
//!   vector, error scalar).
//!
//! [`resolve_all`] polls plugins in the order supplied and turns each answer
//! into an immutable [`PluginResult`]. A timeout is a status value like any
//! other; there is no cancellation and no retry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fixed_point::Q16;
use crate::phase::PhaseVector;

/// Functional category of a plugin.
///
/// Any domain name other than the three well-known ones is [`Custom`].
///
/// [`Custom`]: PluginDomain::Custom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PluginDomain {
    /// Optical refraction correction.
    Refraction,
    /// Frame-dragging correction.
    FrameDrag,
    /// Jitter suppression.
    Jitter,
    /// Any other domain.
    Custom,
}

impl PluginDomain {
    /// One-byte tag used by the canonical encoding.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Refraction => 0x01,
            Self::FrameDrag => 0x02,
            Self::Jitter => 0x03,
            Self::Custom => 0xFF,
        }
    }

    /// Canonical name of the domain.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Refraction => "Refraction",
            Self::FrameDrag => "FrameDrag",
            Self::Jitter => "Jitter",
            Self::Custom => "Custom",
        }
    }
}

impl From<&str> for PluginDomain {
    fn from(name: &str) -> Self {
        match name {
            "Refraction" => Self::Refraction,
            "FrameDrag" => Self::FrameDrag,
            "Jitter" => Self::Jitter,
            _ => Self::Custom,
        }
    }
}

impl From<String> for PluginDomain {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<PluginDomain> for String {
    fn from(domain: PluginDomain) -> Self {
        domain.as_str().to_string()
    }
}

impl fmt::Display for PluginDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status code reported by a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PluginStatus {
    /// The plugin produced a usable contribution.
    Ok,
    /// Not enough input to produce a contribution.
    InsufficientData,
    /// The contribution fell outside the plugin's valid range.
    OutOfRange,
    /// The plugin did not answer in time.
    Timeout,
    /// Sensor readings disagreed.
    SensorMismatch,
}

impl PluginStatus {
    /// Returns `true` for [`PluginStatus::Ok`].
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InsufficientData => "INSUFFICIENT_DATA",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Timeout => "TIMEOUT",
            Self::SensorMismatch => "SENSOR_MISMATCH",
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin identifier.
    pub id: String,
    /// Functional category.
    pub domain: PluginDomain,
    /// Plugin version string.
    pub version: String,
    /// Status the plugin declares before resolution.
    pub status: PluginStatus,
}

/// Contribution returned by [`Plugin::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Status of this resolution.
    pub status: PluginStatus,
    /// Warp contribution.
    pub warp: PhaseVector,
    /// Error contribution.
    pub error: Q16,
}

/// A component contributing warp and error to a delivery run.
///
/// # Example
///
/// ```
/// use iso16_core::fixed_point::Q16;
/// use iso16_core::phase::PhaseVector;
/// use iso16_core::plugin::{
///     Plugin, PluginDomain, PluginManifest, PluginStatus, Resolution, resolve_all,
/// };
///
/// struct Stalled;
///
/// impl Plugin for Stalled {
///     fn manifest(&self) -> PluginManifest {
///         PluginManifest {
///             id: "P-STALL".to_string(),
///             domain: PluginDomain::Jitter,
///             version: "1.0".to_string(),
///             status: PluginStatus::Ok,
///         }
///     }
///
///     fn resolve(&mut self) -> Resolution {
///         Resolution {
///             status: PluginStatus::Timeout,
///             warp: PhaseVector::ZERO,
///             error: Q16::ZERO,
///         }
///     }
/// }
///
/// let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Stalled)];
/// let results = resolve_all(&mut plugins);
/// assert_eq!(results[0].status(), PluginStatus::Timeout);
/// ```
pub trait Plugin {
    /// Returns the plugin's identity.
    fn manifest(&self) -> PluginManifest;

    /// Produces this run's contribution.
    ///
    /// The returned status is authoritative for the run, even when it
    /// differs from the status declared in the manifest.
    fn resolve(&mut self) -> Resolution;
}

/// Immutable record of one plugin's contribution to a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PluginResult {
    id: String,
    domain: PluginDomain,
    warp: PhaseVector,
    error: Q16,
    version: String,
    status: PluginStatus,
}

impl PluginResult {
    /// Creates a result from its parts.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        domain: PluginDomain,
        warp: PhaseVector,
        error: Q16,
        version: impl Into<String>,
        status: PluginStatus,
    ) -> Self {
        Self {
            id: id.into(),
            domain,
            warp,
            error,
            version: version.into(),
            status,
        }
    }

    /// Combines a manifest with the resolution it produced.
    #[must_use]
    pub fn from_resolution(manifest: PluginManifest, resolution: Resolution) -> Self {
        Self {
            id: manifest.id,
            domain: manifest.domain,
            warp: resolution.warp,
            error: resolution.error,
            version: manifest.version,
            status: resolution.status,
        }
    }

    /// Plugin identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Plugin domain.
    #[must_use]
    pub const fn domain(&self) -> PluginDomain {
        self.domain
    }

    /// Warp contribution.
    #[must_use]
    pub const fn warp(&self) -> PhaseVector {
        self.warp
    }

    /// Error contribution.
    #[must_use]
    pub const fn error(&self) -> Q16 {
        self.error
    }

    /// Plugin version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Resolution status.
    #[must_use]
    pub const fn status(&self) -> PluginStatus {
        self.status
    }
}

/// Resolves every plugin in the order supplied.
///
/// Each plugin is queried for its manifest and then resolved; the call does
/// not return until every plugin has answered.
pub fn resolve_all(plugins: &mut [Box<dyn Plugin>]) -> Vec<PluginResult> {
    plugins
        .iter_mut()
        .map(|plugin| {
            let manifest = plugin.manifest();
            let resolution = plugin.resolve();
            if resolution.status != manifest.status {
                tracing::debug!(
                    plugin = %manifest.id,
                    declared = %manifest.status,
                    resolved = %resolution.status,
                    "plugin status changed during resolution"
                );
            }
            PluginResult::from_resolution(manifest, resolution)
        })
        .collect()
}
