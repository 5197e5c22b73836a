//! Error type shared across the policy crate.

use thiserror::Error;

/// Errors from the codec, dataset and prediction layers.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// `merge` was called on a codec with no assigned labels.
    #[error("move codec is empty; build it from a corpus before merging")]
    EmptyCodec,

    /// A persisted codec contained labels that are not a dense 0..V range.
    #[error("corrupt move codec: labels are not a dense range starting at 0")]
    SparseLabels,

    /// A batch was appended to a dataset with a different feature width.
    #[error("feature dimension mismatch: dataset has {expected}, batch has {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A persisted artifact carries a version this build does not understand.
    #[error("unsupported {artifact} version {got} (expected {expected})")]
    UnsupportedVersion {
        artifact: &'static str,
        got: u32,
        expected: u32,
    },

    /// A persisted dataset failed a structural invariant on load.
    #[error("corrupt dataset: {0}")]
    CorruptDataset(String),

    /// The scoring function disagrees with the codec about vocabulary size.
    #[error("scoring function produces {got} scores for {expected} move labels")]
    ScoreLengthMismatch { expected: usize, got: usize },

    /// `select` was invoked on a terminal position.
    #[error("no legal moves in this position; check game end before selecting")]
    NoLegalMoves,

    /// The model artifact could not be loaded or has the wrong shape.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Inference failed at runtime.
    #[error("inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
