//! Chess board widget rendering

use crate::session::GameSession;
use crate::styles::{self, SQUARE_SIZE};
use iced::widget::{button, column, container, row, text};
use iced::{Color, Element, Length};
use shakmaty::{File, Position, Rank, Square};

/// Message type for board interactions
#[derive(Debug, Clone)]
pub enum BoardMessage {
    SquareClicked(Square),
}

/// Renders the chess board
pub struct BoardView<'a> {
    session: &'a GameSession,
    flipped: bool,
}

impl<'a> BoardView<'a> {
    pub fn new(session: &'a GameSession, flipped: bool) -> Self {
        Self { session, flipped }
    }

    /// Create the board view element
    pub fn view(&self) -> Element<'a, BoardMessage> {
        let mut board_column = column![].spacing(0);

        for row_idx in 0..8u32 {
            let rank = if self.flipped { row_idx } else { 7 - row_idx };
            let mut rank_row = row![].spacing(0);

            for col_idx in 0..8u32 {
                let file = if self.flipped { 7 - col_idx } else { col_idx };
                let sq = Square::from_coords(File::new(file), Rank::new(rank));
                rank_row = rank_row.push(self.render_square(sq));
            }

            board_column = board_column.push(rank_row);
        }

        container(board_column)
            .style(|_theme| container::Style {
                border: iced::Border {
                    color: Color::from_rgb(0.3, 0.3, 0.3),
                    width: 2.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    /// Render a single square
    fn render_square(&self, sq: Square) -> Element<'a, BoardMessage> {
        let is_light = (u32::from(sq.rank()) + u32::from(sq.file())) % 2 == 1;
        let mut bg_color = if is_light {
            styles::LIGHT_SQUARE
        } else {
            styles::DARK_SQUARE
        };

        // Highlight selected square
        if self.session.selected == Some(sq) {
            bg_color = styles::SELECTED_SQUARE;
        }

        // Highlight last move
        if let Some((from, to)) = self.session.last_move {
            if sq == from || sq == to {
                bg_color = blend_colors(bg_color, styles::LAST_MOVE_SQUARE);
            }
        }

        let piece_glyph = self
            .session
            .position
            .board()
            .piece_at(sq)
            .map(styles::piece_glyph);

        // Legal move indicator
        let is_legal_target = self.session.legal_targets.contains(&sq);

        let content: Element<'a, BoardMessage> = if let Some(glyph) = piece_glyph {
            text(glyph).size(SQUARE_SIZE * 0.75).center().into()
        } else if is_legal_target {
            // Show dot for legal moves
            text("●")
                .size(SQUARE_SIZE * 0.3)
                .color(Color::from_rgba(0.0, 0.0, 0.0, 0.3))
                .center()
                .into()
        } else {
            text("").into()
        };

        button(
            container(content)
                .width(SQUARE_SIZE)
                .height(SQUARE_SIZE)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        )
        .width(SQUARE_SIZE)
        .height(SQUARE_SIZE)
        .style(move |_theme, status| {
            let hover_overlay = match status {
                button::Status::Hovered => 0.1,
                button::Status::Pressed => 0.2,
                _ => 0.0,
            };
            button::Style {
                background: Some(iced::Background::Color(if hover_overlay > 0.0 {
                    blend_colors(bg_color, Color::from_rgba(1.0, 1.0, 1.0, hover_overlay))
                } else {
                    bg_color
                })),
                border: iced::Border::default(),
                text_color: Color::BLACK,
                ..Default::default()
            }
        })
        .on_press(BoardMessage::SquareClicked(sq))
        .into()
    }
}

/// Blend two colors together
fn blend_colors(base: Color, overlay: Color) -> Color {
    let alpha = overlay.a;
    Color::from_rgb(
        base.r * (1.0 - alpha) + overlay.r * alpha,
        base.g * (1.0 - alpha) + overlay.g * alpha,
        base.b * (1.0 - alpha) + overlay.b * alpha,
    )
}
