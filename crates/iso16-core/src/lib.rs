//! # iso16-core
//!
//! Deterministic ISO-16 true-delivery loop with canonical sealing.
//!
//! A run takes a 16-entry phase state of Q16.16 vectors and a set of
//! plugins. Each plugin contributes a warp vector, an error value and a
//! status. The contributions are summed, the summed warp is applied to every
//! entry, and the result passes only if adjacent entries stay within one
//! Q16.16 unit of each other, every plugin reported `OK`, and the error
//! total is at most one unit.
//!
//! Every input and output of the run is then encoded into a fixed byte
//! layout and hashed with a built-in SHA3-256. Two implementations agree on
//! the seal exactly when they agree on every computed value.
//!
//! ## Modules
//!
//! - [`fixed_point`]: wrapping Q16.16 arithmetic
//! - [`phase`]: phase vectors and the 16-entry phase state
//! - [`plugin`]: the [`Plugin`] trait and [`PluginResult`]
//! - [`engine`]: aggregation, warp, symmetry and error checks, decision
//! - [`seal`]: canonical encoding, Keccak and the seal string
//! - [`conformance`]: vector files, expected outputs, comparison, suites
//! - [`config`]: TOML seal metadata defaults
//!
//! ## Example
//!
//! ```rust
//! use iso16_core::conformance::ConformanceVector;
//! use iso16_core::seal::SealMetadata;
//!
//! let json = format!(
//!     r#"{{"vector_id": "V000", "initial_phase_state": {}, "plugins": {{}}}}"#,
//!     serde_json::json!(vec![[0, 0, 0]; 16]),
//! );
//! let vector = ConformanceVector::from_json_str(&json).unwrap();
//! let run = vector.run(&SealMetadata::default()).unwrap();
//!
//! assert!(run.outcome.decision.true_delivery());
//! assert_eq!(run.seal.as_str().len(), 64);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod conformance;
pub mod engine;
pub mod fixed_point;
pub mod phase;
pub mod plugin;
pub mod seal;

pub use config::{ConfigError, RunnerConfig};
pub use conformance::{ConformanceError, ConformanceVector, ExpectedOutput, LoadError, Verdict};
pub use engine::{DeliveryRun, Outcome, Stage, deliver, evaluate};
pub use fixed_point::Q16;
pub use phase::{PhaseError, PhaseState, PhaseVector};
pub use plugin::{Plugin, PluginDomain, PluginResult, PluginStatus};
pub use seal::{EncodingError, Seal, SealMetadata, compute_seal};
