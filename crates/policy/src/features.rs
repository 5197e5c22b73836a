//! Feature extraction for neural network input
//!
//! Converts a chess position into the flat tensor the policy network
//! consumes. The encoding uses a 12x8x8 representation (one plane per
//! piece type and color), flattened to 768 values.

use shakmaty::{Board, Chess, Color, Position, Role, Square};

/// Number of feature planes: 6 piece types x 2 colors.
pub const NUM_PLANES: usize = 12;

/// Total number of features: 12 x 8 x 8 = 768.
pub const NUM_FEATURES: usize = NUM_PLANES * 64;

/// Encodes a position into the policy network's input tensor.
///
/// The encoding is:
/// - Planes 0-5: White pieces (Pawn, Knight, Bishop, Rook, Queen, King)
/// - Planes 6-11: Black pieces (Pawn, Knight, Bishop, Rook, Queen, King)
///
/// Within each plane, ranks are flipped so that rank 8 maps to row 0 and
/// rank 1 to row 7 (the visual board orientation); files are unflipped.
/// A cell holds 1.0 where the piece exists, 0.0 otherwise.
///
/// Side-to-move is deliberately not part of the tensor: the trained model
/// artifacts were produced with this exact layout, and widening it would
/// invalidate them. Two positions differing only in the turn encode
/// identically.
pub fn encode_position(pos: &Chess) -> Vec<f32> {
    encode_board(pos.board())
}

/// Encodes a bare piece placement; see [`encode_position`] for the layout.
///
/// Pure and deterministic. An empty board yields the all-zero vector.
pub fn encode_board(board: &Board) -> Vec<f32> {
    let mut features = vec![0.0f32; NUM_FEATURES];

    for sq in Square::ALL {
        if let Some(piece) = board.piece_at(sq) {
            let color_offset = if piece.color == Color::White { 0 } else { 6 };
            let plane = color_offset + role_index(piece.role);
            let row = 7 - usize::from(sq.rank());
            let col = usize::from(sq.file());
            features[plane * 64 + row * 8 + col] = 1.0;
        }
    }

    features
}

/// Plane index of a piece role within its color block.
fn role_index(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::CastlingMode;

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .expect("valid FEN")
            .into_position(CastlingMode::Standard)
            .expect("legal position")
    }

    #[test]
    fn startpos_has_one_bit_per_piece() {
        let features = encode_position(&Chess::default());

        assert_eq!(features.len(), NUM_FEATURES);
        let set: usize = features.iter().filter(|&&x| x > 0.0).count();
        assert_eq!(set, 32);
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode_position(&Chess::default());
        let b = encode_position(&Chess::default());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_board_is_all_zero() {
        let features = encode_board(&Board::empty());
        assert!(features.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn orientation_rank_flipped_file_unflipped() {
        let features = encode_position(&Chess::default());

        // White rook on a1: plane 3, row 7 (rank 1), col 0.
        assert_eq!(features[3 * 64 + 7 * 8], 1.0);
        // Black king on e8: plane 11, row 0 (rank 8), col 4.
        assert_eq!(features[11 * 64 + 4], 1.0);
        // White pawn on e2: plane 0, row 6, col 4.
        assert_eq!(features[6 * 8 + 4], 1.0);
    }

    #[test]
    fn set_bits_match_piece_count() {
        let pos = position("k7/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let features = encode_position(&pos);
        let set: usize = features.iter().filter(|&&x| x > 0.0).count();
        assert_eq!(set, 3);
    }

    #[test]
    fn turn_is_not_encoded() {
        // Same placement, opposite side to move: identical tensors. This is
        // a known limitation of the trained artifact's input contract.
        let white = position("k7/8/8/8/8/8/8/4K3 w - - 0 1");
        let black = position("k7/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(encode_position(&white), encode_position(&black));
    }
}
