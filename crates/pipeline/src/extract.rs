//! PGN mainline extraction
//!
//! Replays each game's mainline through shakmaty and records, for every
//! move, the encoded pre-move position and the move's UCI string. These
//! pairs are the raw material for the codec and the training dataset.

use std::io::Read;

use chess_policy::encode_position;
use pgn_reader::{BufferedReader, SanPlus, Skip, Visitor};
use shakmaty::{CastlingMode, Chess, Position};

/// One training sample: position tensor before the move, and the move.
pub struct Sample {
    pub features: Vec<f32>,
    pub uci: String,
}

/// Visitor that turns one game into its sample sequence.
///
/// A SAN token that fails to resolve against the replayed position marks
/// the whole game as bad; partially ingesting a corrupt game would pair
/// positions with moves that were never played from them.
struct SampleVisitor {
    pos: Chess,
    game: Vec<Sample>,
    bad: bool,
}

impl SampleVisitor {
    fn new() -> Self {
        Self {
            pos: Chess::default(),
            game: Vec::new(),
            bad: false,
        }
    }
}

impl Visitor for SampleVisitor {
    type Result = Vec<Sample>;

    fn begin_game(&mut self) {
        self.pos = Chess::default();
        self.game.clear();
        self.bad = false;
    }

    fn san(&mut self, san_plus: SanPlus) {
        if self.bad {
            return;
        }
        match san_plus.san.to_move(&self.pos) {
            Ok(mv) => {
                self.game.push(Sample {
                    features: encode_position(&self.pos),
                    uci: mv.to_uci(CastlingMode::Standard).to_string(),
                });
                self.pos.play_unchecked(&mv);
            }
            Err(_) => {
                self.bad = true;
                self.game.clear();
            }
        }
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true)
    }

    fn end_game(&mut self) -> Vec<Sample> {
        if self.bad {
            Vec::new()
        } else {
            std::mem::take(&mut self.game)
        }
    }
}

/// Reads up to `max_games` games and returns their sample sequences.
///
/// Games dropped for illegal or unparseable SAN are not returned.
pub fn read_games<R: Read>(reader: R, max_games: usize) -> std::io::Result<Vec<Vec<Sample>>> {
    let mut pgn = BufferedReader::new(reader);
    let mut visitor = SampleVisitor::new();
    let mut games = Vec::new();

    while games.len() < max_games {
        match pgn.read_game(&mut visitor)? {
            Some(samples) if !samples.is_empty() => games.push(samples),
            Some(_) => {} // dropped or empty game
            None => break,
        }
    }

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_policy::NUM_FEATURES;
    use std::io::Cursor;

    const SHORT_GAME: &str = "[Event \"Test\"]\n\n1. e4 e5 2. Nf3 1-0\n";

    #[test]
    fn extracts_mainline_samples() {
        let games = read_games(Cursor::new(SHORT_GAME), 10).unwrap();

        assert_eq!(games.len(), 1);
        let uci: Vec<&str> = games[0].iter().map(|s| s.uci.as_str()).collect();
        assert_eq!(uci, vec!["e2e4", "e7e5", "g1f3"]);
        assert!(games[0].iter().all(|s| s.features.len() == NUM_FEATURES));
    }

    #[test]
    fn first_sample_encodes_the_starting_position() {
        let games = read_games(Cursor::new(SHORT_GAME), 10).unwrap();
        let startpos = encode_position(&Chess::default());
        assert_eq!(games[0][0].features, startpos);
    }

    #[test]
    fn castling_uses_standard_uci() {
        let pgn = "[Event \"Test\"]\n\n1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O 1-0\n";
        let games = read_games(Cursor::new(pgn), 10).unwrap();
        assert_eq!(games[0].last().unwrap().uci, "e1g1");
    }

    #[test]
    fn illegal_san_drops_the_game() {
        let pgn = "[Event \"Bad\"]\n\n1. e5 e5 1-0\n\n[Event \"Good\"]\n\n1. d4 1-0\n";
        let games = read_games(Cursor::new(pgn), 10).unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0][0].uci, "d2d4");
    }

    #[test]
    fn respects_max_games() {
        let pgn = "1. e4 1-0\n\n1. d4 1-0\n\n1. c4 1-0\n";
        let games = read_games(Cursor::new(pgn), 2).unwrap();
        assert_eq!(games.len(), 2);
    }

    #[test]
    fn variations_are_skipped() {
        let pgn = "[Event \"Var\"]\n\n1. e4 (1. d4 d5) 1... e5 1-0\n";
        let games = read_games(Cursor::new(pgn), 10).unwrap();
        let uci: Vec<&str> = games[0].iter().map(|s| s.uci.as_str()).collect();
        assert_eq!(uci, vec!["e2e4", "e7e5"]);
    }
}
