//! Policy-side building blocks for policy-chess
//!
//! This crate holds everything the GUI and the offline data pipeline share:
//! - Position encoding into the fixed 768-value feature tensor
//! - The move codec (UCI move string <-> dense integer label)
//! - The move predictor that turns model scores into a legal move
//! - Dataset persistence for the offline training pipeline
//!
//! Chess rules are never implemented here. Legality, move application and
//! game-end detection are all delegated to `shakmaty`.
//!
//! # Persisted artifacts
//!
//! All artifacts live in a single data directory:
//! ```text
//! data/
//!   move_dict.json    move string -> label (forward map only; reverse derived)
//!   dataset.json      encoded positions + labels for training
//!   model.onnx        trained scoring function (external trainer output)
//! ```

pub mod codec;
pub mod dataset;
mod error;
pub mod features;
pub mod predictor;

#[cfg(feature = "onnx")]
mod model;

pub use codec::MoveCodec;
pub use dataset::Dataset;
pub use error::PolicyError;
pub use features::{encode_board, encode_position, NUM_FEATURES, NUM_PLANES};
pub use predictor::{Predictor, Scorer};

#[cfg(feature = "onnx")]
pub use model::OnnxPolicy;

use std::path::Path;

/// File name of the persisted move codec (forward map).
pub const MOVE_DICT_FILE: &str = "move_dict.json";
/// File name of the persisted training dataset.
pub const DATASET_FILE: &str = "dataset.json";
/// File name of the trained ONNX model artifact.
pub const MODEL_FILE: &str = "model.onnx";

/// Loads the full move-selection stack from a data directory.
///
/// Reads the move codec and the ONNX model and wires them into a
/// [`Predictor`]. Any missing or malformed artifact is an error: callers
/// are expected to fail fast at startup rather than run degraded.
#[cfg(feature = "onnx")]
pub fn load_policy(data_dir: &Path) -> Result<Predictor<OnnxPolicy>, PolicyError> {
    let codec = MoveCodec::load(&data_dir.join(MOVE_DICT_FILE))?;
    let model = OnnxPolicy::load(&data_dir.join(MODEL_FILE))?;
    Predictor::new(model, codec)
}
