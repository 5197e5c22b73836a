//! Training dataset persistence
//!
//! Parallel arrays of encoded positions and move labels, written as a
//! single version-tagged JSON file. Labels are stored densely; one-hot
//! expansion against `num_classes` is left to the external trainer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Current on-disk format version of `dataset.json`.
pub const DATASET_VERSION: u32 = 1;

/// A labelled corpus of encoded positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    version: u32,
    num_features: usize,
    num_classes: usize,
    positions: Vec<Vec<f32>>,
    labels: Vec<u32>,
}

impl Dataset {
    /// Creates an empty dataset with a fixed feature width.
    pub fn new(num_features: usize) -> Self {
        Self {
            version: DATASET_VERSION,
            num_features,
            num_classes: 0,
            positions: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Adds one sample. The feature vector must match the dataset width.
    pub fn push(&mut self, features: Vec<f32>, label: u32) -> Result<(), PolicyError> {
        if features.len() != self.num_features {
            return Err(PolicyError::DimensionMismatch {
                expected: self.num_features,
                got: features.len(),
            });
        }
        self.num_classes = self.num_classes.max(label as usize + 1);
        self.positions.push(features);
        self.labels.push(label);
        Ok(())
    }

    /// Appends a whole batch.
    ///
    /// A feature-width mismatch between the existing data and the batch is
    /// fatal: truncating or padding would silently corrupt the corpus.
    pub fn append(&mut self, batch: Dataset) -> Result<(), PolicyError> {
        if batch.num_features != self.num_features {
            return Err(PolicyError::DimensionMismatch {
                expected: self.num_features,
                got: batch.num_features,
            });
        }
        self.num_classes = self.num_classes.max(batch.num_classes);
        self.positions.extend(batch.positions);
        self.labels.extend(batch.labels);
        Ok(())
    }

    /// Raises the declared class count, e.g. after a codec merge grew the
    /// vocabulary beyond the labels present in this file. Never shrinks.
    pub fn grow_classes(&mut self, num_classes: usize) {
        self.num_classes = self.num_classes.max(num_classes);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Iterates over `(features, label)` samples in insertion order.
    pub fn samples(&self) -> impl Iterator<Item = (&[f32], u32)> {
        self.positions
            .iter()
            .map(Vec::as_slice)
            .zip(self.labels.iter().copied())
    }

    /// Saves the dataset as JSON.
    pub fn save(&self, path: &Path) -> Result<(), PolicyError> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a dataset, validating version and structural invariants.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&contents)?;

        if dataset.version != DATASET_VERSION {
            return Err(PolicyError::UnsupportedVersion {
                artifact: "dataset",
                got: dataset.version,
                expected: DATASET_VERSION,
            });
        }
        if dataset.positions.len() != dataset.labels.len() {
            return Err(PolicyError::CorruptDataset(format!(
                "{} positions but {} labels",
                dataset.positions.len(),
                dataset.labels.len()
            )));
        }
        if let Some(bad) = dataset
            .positions
            .iter()
            .position(|p| p.len() != dataset.num_features)
        {
            return Err(PolicyError::CorruptDataset(format!(
                "sample {} has {} features, header declares {}",
                bad,
                dataset.positions[bad].len(),
                dataset.num_features
            )));
        }
        if let Some(&bad) = dataset
            .labels
            .iter()
            .find(|&&l| l as usize >= dataset.num_classes)
        {
            return Err(PolicyError::CorruptDataset(format!(
                "label {} out of range for {} classes",
                bad, dataset.num_classes
            )));
        }

        Ok(dataset)
    }
}
