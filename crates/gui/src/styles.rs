//! Styling constants and theme configuration

use iced::Color;
use shakmaty::{Piece, Role};

// Board colors
pub const LIGHT_SQUARE: Color = Color::from_rgb(0.94, 0.85, 0.71); // Wheat
pub const DARK_SQUARE: Color = Color::from_rgb(0.71, 0.53, 0.39); // Sienna
pub const SELECTED_SQUARE: Color = Color::from_rgb(0.68, 0.85, 0.37); // Yellow-green
pub const LAST_MOVE_SQUARE: Color = Color::from_rgba(0.9, 0.9, 0.0, 0.4); // Yellow overlay

// Dimensions
pub const SQUARE_SIZE: f32 = 70.0;
pub const PANEL_WIDTH: f32 = 320.0;

/// Unicode glyph for a piece.
pub fn piece_glyph(piece: Piece) -> &'static str {
    match (piece.color.is_white(), piece.role) {
        (true, Role::King) => "♔",
        (true, Role::Queen) => "♕",
        (true, Role::Rook) => "♖",
        (true, Role::Bishop) => "♗",
        (true, Role::Knight) => "♘",
        (true, Role::Pawn) => "♙",
        (false, Role::King) => "♚",
        (false, Role::Queen) => "♛",
        (false, Role::Rook) => "♜",
        (false, Role::Bishop) => "♝",
        (false, Role::Knight) => "♞",
        (false, Role::Pawn) => "♟",
    }
}
