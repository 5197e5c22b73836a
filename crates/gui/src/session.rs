//! Game session: click handling and game-state ownership
//!
//! The session owns the rules engine's position and translates board
//! clicks into move attempts. All legality questions go to shakmaty; the
//! session only manages the two-phase select-source/select-destination
//! gesture, the promotion disambiguation state, and the game outcome.

use std::collections::HashSet;

use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, File, Move, Position, Role, Square};

/// Terminal state of a game, reported to the host instead of exiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Ongoing,
    /// Checkmate; the winner is the side that delivered it.
    Checkmate(Color),
    Stalemate,
    /// Drawn by insufficient material.
    Draw,
}

/// Represents one game in progress.
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Current position (exclusively owned; shakmaty mutates it for us).
    pub position: Chess,
    /// Source square selected by the first click, if any.
    pub selected: Option<Square>,
    /// Destination squares of legal moves from `selected` (for highlights).
    pub legal_targets: HashSet<Square>,
    /// A promotion waiting for the player to pick a piece. While set, the
    /// session ignores board clicks: this replaces the original's nested
    /// modal event loop with an explicit awaiting-disambiguation state.
    pub pending_promotion: Option<(Square, Square)>,
    /// Last applied move, as (from, to) display squares.
    pub last_move: Option<(Square, Square)>,
    /// Move history in UCI notation.
    pub moves: Vec<String>,
    /// Game outcome; `Ongoing` until the rules engine says otherwise.
    pub outcome: GameOutcome,
    /// Is the side to move currently in check?
    pub in_check: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            position: Chess::default(),
            selected: None,
            legal_targets: HashSet::new(),
            pending_promotion: None,
            last_move: None,
            moves: Vec::new(),
            outcome: GameOutcome::Ongoing,
            in_check: false,
        }
    }

    /// Starts a session from an arbitrary position.
    pub fn from_position(position: Chess) -> Self {
        let mut session = Self {
            position,
            ..Self::new()
        };
        session.update_outcome();
        session
    }

    /// Handles a click on a board square.
    ///
    /// First click selects a piece of the side to move (anything else is a
    /// no-op). The second click builds a candidate move and submits it to
    /// the rules engine: legal moves are applied, illegal ones discarded.
    /// Either way the selection is spent. A pawn reaching the back rank
    /// suspends into `pending_promotion` instead of moving immediately.
    pub fn handle_click(&mut self, sq: Square) {
        if self.outcome != GameOutcome::Ongoing || self.pending_promotion.is_some() {
            return;
        }

        let Some(from) = self.selected else {
            if let Some(piece) = self.position.board().piece_at(sq) {
                if piece.color == self.position.turn() {
                    self.selected = Some(sq);
                    self.refresh_targets();
                }
            }
            return;
        };

        if self.is_legal_promotion(from, sq) {
            self.pending_promotion = Some((from, sq));
            return;
        }

        let candidate = UciMove::Normal {
            from,
            to: sq,
            promotion: None,
        };
        match candidate.to_move(&self.position) {
            Ok(mv) => self.apply_move(mv),
            Err(_) => self.clear_selection(),
        }
    }

    /// Finalizes a pending promotion with the chosen piece.
    pub fn choose_promotion(&mut self, role: Role) {
        let Some((from, to)) = self.pending_promotion.take() else {
            return;
        };

        let candidate = UciMove::Normal {
            from,
            to,
            promotion: Some(role),
        };
        match candidate.to_move(&self.position) {
            Ok(mv) => self.apply_move(mv),
            Err(_) => self.clear_selection(),
        }
    }

    /// Applies an engine-chosen move. Ignored if the engine misbehaves and
    /// hands back a move that is illegal in the current position.
    pub fn apply_engine_move(&mut self, mv: Move) {
        if self.outcome == GameOutcome::Ongoing && self.position.is_legal(&mv) {
            self.apply_move(mv);
        }
    }

    fn apply_move(&mut self, mv: Move) {
        self.moves
            .push(mv.to_uci(CastlingMode::Standard).to_string());
        self.last_move = Some(display_squares(&mv));
        self.position.play_unchecked(&mv);
        self.clear_selection();
        self.update_outcome();
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.legal_targets.clear();
    }

    /// True when moving from->to is a pawn promotion with at least one
    /// legal promotion choice.
    fn is_legal_promotion(&self, from: Square, to: Square) -> bool {
        self.position
            .legal_moves()
            .iter()
            .any(|m| m.from() == Some(from) && m.to() == to && m.is_promotion())
    }

    fn refresh_targets(&mut self) {
        self.legal_targets.clear();
        let Some(from) = self.selected else { return };

        for mv in self.position.legal_moves() {
            match mv {
                Move::Castle { king, rook } if king == from => {
                    self.legal_targets.insert(king_destination(king, rook));
                }
                _ if mv.from() == Some(from) => {
                    self.legal_targets.insert(mv.to());
                }
                _ => {}
            }
        }
    }

    fn update_outcome(&mut self) {
        self.in_check = self.position.is_check();
        self.outcome = if self.position.is_checkmate() {
            GameOutcome::Checkmate(self.position.turn().other())
        } else if self.position.is_stalemate() {
            GameOutcome::Stalemate
        } else if self.position.is_insufficient_material() {
            GameOutcome::Draw
        } else {
            GameOutcome::Ongoing
        };
    }
}

/// Display squares for highlighting. Castling is stored by shakmaty as
/// king-takes-rook; the board shows the king's actual destination.
fn display_squares(mv: &Move) -> (Square, Square) {
    match *mv {
        Move::Castle { king, rook } => (king, king_destination(king, rook)),
        _ => (mv.from().unwrap_or_else(|| mv.to()), mv.to()),
    }
}

/// Where the king lands when castling with the given rook.
fn king_destination(king: Square, rook: Square) -> Square {
    let file = if rook.file() > king.file() {
        File::G
    } else {
        File::C
    };
    Square::from_coords(file, king.rank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;

    fn session_from(fen: &str) -> GameSession {
        let pos = fen
            .parse::<Fen>()
            .expect("valid FEN")
            .into_position(CastlingMode::Standard)
            .expect("legal position");
        GameSession::from_position(pos)
    }

    fn play(session: &mut GameSession, uci: &str) {
        let mv = uci
            .parse::<UciMove>()
            .unwrap()
            .to_move(&session.position)
            .unwrap();
        session.apply_engine_move(mv);
    }

    #[test]
    fn two_clicks_apply_a_move() {
        let mut session = GameSession::new();

        session.handle_click(Square::E2);
        assert_eq!(session.selected, Some(Square::E2));
        assert!(session.legal_targets.contains(&Square::E4));

        session.handle_click(Square::E4);
        assert_eq!(session.moves, vec!["e2e4".to_string()]);
        assert_eq!(session.selected, None);
        assert_eq!(session.outcome, GameOutcome::Ongoing);
        assert!(!session.in_check);
    }

    #[test]
    fn clicking_an_empty_square_without_selection_is_a_noop() {
        let mut session = GameSession::new();
        session.handle_click(Square::E4);

        assert_eq!(session.selected, None);
        assert!(session.moves.is_empty());
    }

    #[test]
    fn clicking_an_opponent_piece_does_not_select() {
        let mut session = GameSession::new();
        session.handle_click(Square::E7);
        assert_eq!(session.selected, None);
    }

    #[test]
    fn illegal_destination_spends_the_selection() {
        let mut session = GameSession::new();
        session.handle_click(Square::E2);
        session.handle_click(Square::E5);

        assert!(session.moves.is_empty());
        assert_eq!(session.selected, None);
        assert!(session.legal_targets.is_empty());
    }

    #[test]
    fn promotion_suspends_until_a_piece_is_chosen() {
        let mut session = session_from("k7/4P3/8/8/8/8/8/4K3 w - - 0 1");

        session.handle_click(Square::E7);
        session.handle_click(Square::E8);

        assert_eq!(session.pending_promotion, Some((Square::E7, Square::E8)));
        assert!(session.moves.is_empty());

        // Clicks are ignored while the choice is pending.
        session.handle_click(Square::E1);
        assert_eq!(session.selected, Some(Square::E7));

        session.choose_promotion(Role::Queen);
        assert_eq!(session.moves, vec!["e7e8q".to_string()]);
        assert_eq!(session.pending_promotion, None);
        assert!(session.in_check);
        assert_eq!(session.outcome, GameOutcome::Ongoing);
    }

    #[test]
    fn underpromotion_is_honored() {
        let mut session = session_from("k7/4P3/8/8/8/8/8/4K3 w - - 0 1");
        session.handle_click(Square::E7);
        session.handle_click(Square::E8);
        session.choose_promotion(Role::Knight);

        assert_eq!(session.moves, vec!["e7e8n".to_string()]);
    }

    #[test]
    fn checkmate_reports_the_winner() {
        let mut session = GameSession::new();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            play(&mut session, uci);
        }

        assert_eq!(session.outcome, GameOutcome::Checkmate(Color::Black));
        assert!(session.in_check);

        // The session is terminal: further clicks change nothing.
        session.handle_click(Square::E2);
        assert_eq!(session.selected, None);
    }

    #[test]
    fn stalemate_is_reported() {
        let session = session_from("k7/8/1Q6/8/8/8/8/7K b - - 0 1");
        assert_eq!(session.outcome, GameOutcome::Stalemate);
        assert!(!session.in_check);
    }

    #[test]
    fn bare_kings_are_a_draw() {
        let session = session_from("k7/8/8/8/8/8/8/7K w - - 0 1");
        assert_eq!(session.outcome, GameOutcome::Draw);
    }

    #[test]
    fn castling_click_lands_on_the_king_destination() {
        let mut session =
            session_from("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");

        session.handle_click(Square::E1);
        assert!(session.legal_targets.contains(&Square::G1));

        session.handle_click(Square::G1);
        assert_eq!(session.moves, vec!["e1g1".to_string()]);
        assert_eq!(session.last_move, Some((Square::E1, Square::G1)));
    }

    #[test]
    fn engine_move_is_verified_before_applying() {
        let mut session = GameSession::new();
        // e7e5 is black's move; the engine handing it to a white-to-move
        // session must be rejected.
        let mv = "e7e5"
            .parse::<UciMove>()
            .unwrap()
            .to_move(&{
                let mut pos = Chess::default();
                let first = "e2e4".parse::<UciMove>().unwrap().to_move(&pos).unwrap();
                pos.play_unchecked(&first);
                pos
            })
            .unwrap();

        session.apply_engine_move(mv);
        assert!(session.moves.is_empty());
    }
}
