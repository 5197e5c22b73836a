//! Move codec: canonical UCI move strings <-> dense integer labels
//!
//! The policy network scores moves by label, so training and inference
//! need an agreed, stable numbering of every move string seen in the
//! corpus. Labels are assigned lexicographically at build time so that
//! re-running on the same corpus reproduces the same mapping, and merging
//! a new corpus never reassigns an existing label.
//!
//! Only the forward map is persisted; the reverse map is derived on load.
//! Storing both (as the original pipeline did) lets the two files drift
//! apart silently.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Current on-disk format version of `move_dict.json`.
pub const CODEC_VERSION: u32 = 1;

/// Bijective mapping between canonical move strings and labels `0..V`.
#[derive(Debug, Clone, Default)]
pub struct MoveCodec {
    forward: BTreeMap<String, u32>,
    reverse: HashMap<u32, String>,
}

/// Serialized form: version tag plus the forward map.
#[derive(Serialize, Deserialize)]
struct CodecFile {
    version: u32,
    moves: BTreeMap<String, u32>,
}

impl MoveCodec {
    /// Builds a codec from a move corpus.
    ///
    /// Duplicates are collapsed; labels are assigned in lexicographic
    /// order of the move strings, starting at 0.
    pub fn build<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = moves.into_iter().map(Into::into).collect();

        let mut codec = MoveCodec::default();
        for (label, mv) in unique.into_iter().enumerate() {
            codec.insert(mv, label as u32);
        }
        codec
    }

    /// Merges new moves into an existing codec.
    ///
    /// Every previously assigned label is preserved. Unseen moves are
    /// appended in lexicographic order starting at `max(existing) + 1`.
    /// Returns the number of labels added.
    ///
    /// Merging into an empty codec is an error: there is no existing
    /// maximum to append after, and it almost always means a missing
    /// `move_dict.json` rather than a fresh corpus.
    pub fn merge<I, S>(&mut self, moves: I) -> Result<usize, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self
            .forward
            .values()
            .max()
            .copied()
            .ok_or(PolicyError::EmptyCodec)?
            + 1;

        let unique: BTreeSet<String> = moves.into_iter().map(Into::into).collect();

        let mut added = 0;
        for mv in unique {
            if !self.forward.contains_key(&mv) {
                self.insert(mv, next);
                next += 1;
                added += 1;
            }
        }
        Ok(added)
    }

    fn insert(&mut self, mv: String, label: u32) {
        self.reverse.insert(label, mv.clone());
        self.forward.insert(mv, label);
    }

    /// Label for a move string, if it was in the corpus.
    pub fn encode(&self, mv: &str) -> Option<u32> {
        self.forward.get(mv).copied()
    }

    /// Move string for a label, if assigned.
    pub fn decode(&self, label: u32) -> Option<&str> {
        self.reverse.get(&label).map(String::as_str)
    }

    /// Vocabulary size V. Labels are always the dense range `0..V`.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterates over `(move, label)` pairs in lexicographic move order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.forward.iter().map(|(mv, &label)| (mv.as_str(), label))
    }

    /// Saves the forward map as version-tagged JSON.
    ///
    /// `BTreeMap` keeps the output deterministic for a given mapping.
    pub fn save(&self, path: &Path) -> Result<(), PolicyError> {
        let file = CodecFile {
            version: CODEC_VERSION,
            moves: self.forward.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a codec, deriving the reverse map from the forward map.
    ///
    /// Rejects files whose labels are not a dense `0..V` range: a hole or
    /// duplicate means the artifact was edited or corrupted, and every
    /// downstream consumer assumes density.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path)?;
        let file: CodecFile = serde_json::from_str(&contents)?;

        if file.version != CODEC_VERSION {
            return Err(PolicyError::UnsupportedVersion {
                artifact: "move codec",
                got: file.version,
                expected: CODEC_VERSION,
            });
        }

        let mut codec = MoveCodec::default();
        for (mv, label) in file.moves {
            codec.insert(mv, label);
        }

        let dense = (0..codec.len() as u32).all(|l| codec.reverse.contains_key(&l));
        if !dense || codec.reverse.len() != codec.forward.len() {
            return Err(PolicyError::SparseLabels);
        }

        Ok(codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<&'static str> {
        vec!["e2e4", "d2d4", "g1f3", "e2e4", "e7e8q"]
    }

    #[test]
    fn build_assigns_lexicographic_labels() {
        let codec = MoveCodec::build(corpus());

        assert_eq!(codec.len(), 4);
        assert_eq!(codec.encode("d2d4"), Some(0));
        assert_eq!(codec.encode("e2e4"), Some(1));
        assert_eq!(codec.encode("e7e8q"), Some(2));
        assert_eq!(codec.encode("g1f3"), Some(3));
    }

    #[test]
    fn build_is_reproducible() {
        let a = MoveCodec::build(corpus());
        let b = MoveCodec::build(corpus());
        for (mv, label) in a.iter() {
            assert_eq!(b.encode(mv), Some(label));
        }
    }

    #[test]
    fn round_trip_every_label() {
        let codec = MoveCodec::build(corpus());
        for (mv, label) in codec.iter() {
            assert_eq!(codec.decode(label), Some(mv));
        }
    }

    #[test]
    fn merge_preserves_existing_labels() {
        let mut codec = MoveCodec::build(corpus());
        let before: Vec<(String, u32)> =
            codec.iter().map(|(m, l)| (m.to_string(), l)).collect();

        let added = codec.merge(vec!["a2a4", "e2e4", "h2h4"]).unwrap();
        assert_eq!(added, 2);

        for (mv, label) in before {
            assert_eq!(codec.encode(&mv), Some(label));
        }
        // Appended in sorted order after the previous maximum.
        assert_eq!(codec.encode("a2a4"), Some(4));
        assert_eq!(codec.encode("h2h4"), Some(5));
    }

    #[test]
    fn merge_on_empty_codec_fails() {
        let mut codec = MoveCodec::default();
        assert!(matches!(
            codec.merge(vec!["e2e4"]),
            Err(PolicyError::EmptyCodec)
        ));
    }

    #[test]
    fn unknown_moves_and_labels_miss() {
        let codec = MoveCodec::build(corpus());
        assert_eq!(codec.encode("b1c3"), None);
        assert_eq!(codec.decode(99), None);
    }

    #[test]
    fn save_load_round_trip() {
        let path = std::env::temp_dir().join(format!("move_dict_{}.json", std::process::id()));
        let codec = MoveCodec::build(corpus());
        codec.save(&path).unwrap();

        let loaded = MoveCodec::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), codec.len());
        for (mv, label) in codec.iter() {
            assert_eq!(loaded.encode(mv), Some(label));
            assert_eq!(loaded.decode(label), Some(mv));
        }
    }

    #[test]
    fn load_rejects_sparse_labels() {
        let path = std::env::temp_dir().join(format!("move_dict_sparse_{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"version":1,"moves":{"d2d4":0,"e2e4":2}}"#,
        )
        .unwrap();

        let result = MoveCodec::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PolicyError::SparseLabels)));
    }

    #[test]
    fn load_rejects_unknown_version() {
        let path = std::env::temp_dir().join(format!("move_dict_ver_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"version":9,"moves":{"e2e4":0}}"#).unwrap();

        let result = MoveCodec::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            result,
            Err(PolicyError::UnsupportedVersion { got: 9, .. })
        ));
    }
}
