//! Move selection from policy scores
//!
//! The predictor glues three collaborators together: the position encoder,
//! a trained scoring function, and the rules engine's legal-move set. The
//! scoring function has no legality constraint, so its top pick can be an
//! illegal move; that case is recovered locally by falling back to a
//! uniformly random legal move, never surfaced as an error.

use rand::seq::SliceRandom;
use rand::Rng;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, Move, Position};

use crate::codec::MoveCodec;
use crate::error::PolicyError;
use crate::features::encode_position;

/// A trained scoring function: feature tensor in, one score per label out.
///
/// Implemented by [`crate::OnnxPolicy`] for real inference; tests stub it.
pub trait Scorer {
    /// Width of the score vector this function produces.
    fn num_outputs(&self) -> usize;

    /// Scores an encoded position. The result has `num_outputs` entries.
    fn score(&self, features: &[f32]) -> Result<Vec<f32>, PolicyError>;
}

/// Stateless move selector over a scoring function and a move codec.
pub struct Predictor<S> {
    scorer: S,
    codec: MoveCodec,
}

impl<S: Scorer> Predictor<S> {
    /// Wires a scoring function to a codec.
    ///
    /// The two must agree on vocabulary size; a mismatch means the model
    /// and `move_dict.json` come from different training runs, which is
    /// fatal at load time.
    pub fn new(scorer: S, codec: MoveCodec) -> Result<Self, PolicyError> {
        if scorer.num_outputs() != codec.len() {
            return Err(PolicyError::ScoreLengthMismatch {
                expected: codec.len(),
                got: scorer.num_outputs(),
            });
        }
        Ok(Self { scorer, codec })
    }

    pub fn codec(&self) -> &MoveCodec {
        &self.codec
    }

    /// Selects a move for the side to move.
    ///
    /// Scores the position, takes the best-scored label, and decodes it to
    /// a move. If that move is illegal in this position (or the label does
    /// not decode at all), a uniformly random legal move is returned
    /// instead.
    ///
    /// Errors with [`PolicyError::NoLegalMoves`] on a terminal position;
    /// callers check game end first. For any non-terminal position a move
    /// from the legal set is always returned.
    pub fn select<R: Rng>(&self, pos: &Chess, rng: &mut R) -> Result<Move, PolicyError> {
        let legal = pos.legal_moves();
        if legal.is_empty() {
            return Err(PolicyError::NoLegalMoves);
        }

        let scores = self.scorer.score(&encode_position(pos))?;
        if scores.len() != self.codec.len() {
            return Err(PolicyError::ScoreLengthMismatch {
                expected: self.codec.len(),
                got: scores.len(),
            });
        }

        if let Some(mv) = self.top_legal_move(&scores, pos) {
            return Ok(mv);
        }

        legal
            .choose(rng)
            .cloned()
            .ok_or(PolicyError::NoLegalMoves)
    }

    /// Decodes the argmax label into a legal move, if it is one.
    fn top_legal_move(&self, scores: &[f32], pos: &Chess) -> Option<Move> {
        let (label, _) = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))?;

        let uci: UciMove = self.codec.decode(label as u32)?.parse().ok()?;
        uci.to_move(pos).ok()
    }
}
