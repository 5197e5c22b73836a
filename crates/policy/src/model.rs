//! ONNX model loading and inference
//!
//! Wraps the trained scoring function artifact. Requires the `onnx`
//! feature to be enabled.

use std::path::Path;

use tract_onnx::prelude::*;

use crate::error::PolicyError;
use crate::features::NUM_FEATURES;
use crate::predictor::Scorer;

/// The trained policy network, loaded from an ONNX artifact.
///
/// Maps a 768-value feature tensor to one score per move label.
pub struct OnnxPolicy {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
    input_size: usize,
    output_size: usize,
}

impl OnnxPolicy {
    /// Loads an ONNX model from the given path.
    ///
    /// A model whose input width does not match the position encoder is
    /// rejected here rather than producing garbage scores later.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| PolicyError::ModelLoad(format!("{}: {}", path.display(), e)))?
            .into_optimized()
            .map_err(|e| PolicyError::ModelLoad(format!("failed to optimize model: {}", e)))?
            .into_runnable()
            .map_err(|e| PolicyError::ModelLoad(format!("failed to make model runnable: {}", e)))?;

        let input_size = fact_size(
            model
                .model()
                .input_fact(0)
                .map_err(|e| PolicyError::ModelLoad(format!("failed to get input fact: {}", e)))?,
        );
        let output_size = fact_size(
            model
                .model()
                .output_fact(0)
                .map_err(|e| PolicyError::ModelLoad(format!("failed to get output fact: {}", e)))?,
        );

        if input_size != NUM_FEATURES {
            return Err(PolicyError::ModelLoad(format!(
                "model expects {} inputs but the encoder produces {}",
                input_size, NUM_FEATURES
            )));
        }

        Ok(Self {
            model,
            input_size,
            output_size,
        })
    }
}

/// Number of elements in a tensor fact, ignoring symbolic dimensions.
fn fact_size(fact: &TypedFact) -> usize {
    fact.shape
        .iter()
        .filter_map(|d| d.to_i64().ok())
        .product::<i64>() as usize
}

impl Scorer for OnnxPolicy {
    fn num_outputs(&self) -> usize {
        self.output_size
    }

    fn score(&self, features: &[f32]) -> Result<Vec<f32>, PolicyError> {
        let input: Tensor =
            tract_ndarray::Array::from_shape_vec((1, self.input_size), features.to_vec())
                .map_err(|e| PolicyError::Inference(e.to_string()))?
                .into();

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| PolicyError::Inference(e.to_string()))?;

        let scores = result[0]
            .to_array_view::<f32>()
            .map_err(|e| PolicyError::Inference(e.to_string()))?;

        Ok(scores.iter().copied().collect())
    }
}
