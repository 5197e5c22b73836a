//! Main application state and logic

use std::sync::Arc;

use crate::board::{BoardMessage, BoardView};
use crate::session::{GameOutcome, GameSession};
use crate::styles::PANEL_WIDTH;

use chess_policy::{OnnxPolicy, Predictor};
use iced::widget::{
    button, column, container, horizontal_rule, pick_list, row, scrollable, text, vertical_space,
};
use iced::{Element, Length, Task, Theme};
use shakmaty::{Color, Move, Position, Role};

/// Player type for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    #[default]
    Human,
    Neural,
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerType::Human => write!(f, "Human"),
            PlayerType::Neural => write!(f, "Neural Policy"),
        }
    }
}

/// Main application state
pub struct ChessApp {
    /// Current game
    session: GameSession,
    /// Board flipped?
    board_flipped: bool,
    /// White player type
    white_player: PlayerType,
    /// Black player type
    black_player: PlayerType,
    /// The trained move selector, shared with background tasks
    policy: Arc<Predictor<OnnxPolicy>>,
    /// Engine thinking in background
    engine_task_running: bool,
    /// Last engine failure, shown in the status line
    engine_error: Option<String>,
}

/// Application messages
#[derive(Debug, Clone)]
pub enum Message {
    // Board interaction
    Board(BoardMessage),
    PromotionChosen(Role),

    // Game controls
    NewGame,
    FlipBoard,
    WhitePlayerChanged(PlayerType),
    BlackPlayerChanged(PlayerType),

    // Engine
    EngineMoveReady(Move),
    EngineFailed(String),
}

impl ChessApp {
    pub fn new(policy: Arc<Predictor<OnnxPolicy>>) -> (Self, Task<Message>) {
        (
            Self {
                session: GameSession::new(),
                board_flipped: false,
                white_player: PlayerType::Human,
                black_player: PlayerType::Neural,
                policy,
                engine_task_running: false,
                engine_error: None,
            },
            Task::none(),
        )
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn current_player(&self) -> PlayerType {
        if self.session.position.turn() == Color::White {
            self.white_player
        } else {
            self.black_player
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Board(BoardMessage::SquareClicked(sq)) => {
                // Only allow human moves
                if self.current_player() == PlayerType::Human
                    && self.session.outcome == GameOutcome::Ongoing
                    && !self.engine_task_running
                {
                    self.session.handle_click(sq);
                    return self.maybe_trigger_engine_move();
                }
                Task::none()
            }

            Message::PromotionChosen(role) => {
                self.session.choose_promotion(role);
                self.maybe_trigger_engine_move()
            }

            Message::NewGame => {
                self.session = GameSession::new();
                self.engine_task_running = false;
                self.engine_error = None;
                self.maybe_trigger_engine_move()
            }

            Message::FlipBoard => {
                self.board_flipped = !self.board_flipped;
                Task::none()
            }

            Message::WhitePlayerChanged(player) => {
                self.white_player = player;
                self.maybe_trigger_engine_move()
            }

            Message::BlackPlayerChanged(player) => {
                self.black_player = player;
                self.maybe_trigger_engine_move()
            }

            Message::EngineMoveReady(mv) => {
                self.engine_task_running = false;
                if self.session.outcome == GameOutcome::Ongoing {
                    self.session.apply_engine_move(mv);
                    // The opponent may also be an engine
                    return self.maybe_trigger_engine_move();
                }
                Task::none()
            }

            Message::EngineFailed(err) => {
                self.engine_task_running = false;
                self.engine_error = Some(err);
                Task::none()
            }
        }
    }

    /// Check if the current player is the engine and trigger move selection
    fn maybe_trigger_engine_move(&mut self) -> Task<Message> {
        if self.session.outcome != GameOutcome::Ongoing
            || self.session.pending_promotion.is_some()
            || self.engine_task_running
            || self.current_player() == PlayerType::Human
        {
            return Task::none();
        }

        self.engine_task_running = true;

        let policy = Arc::clone(&self.policy);
        let position = self.session.position.clone();

        Task::perform(
            async move {
                // Inference is CPU-bound; keep it off the UI runtime
                tokio::task::spawn_blocking(move || {
                    policy
                        .select(&position, &mut rand::thread_rng())
                        .map_err(|e| e.to_string())
                })
                .await
                .map_err(|e| e.to_string())
                .and_then(|r| r)
            },
            |result| match result {
                Ok(mv) => Message::EngineMoveReady(mv),
                Err(e) => Message::EngineFailed(e),
            },
        )
    }

    pub fn view(&self) -> Element<'_, Message> {
        let board = BoardView::new(&self.session, self.board_flipped)
            .view()
            .map(Message::Board);

        let panel = self.control_panel();

        row![
            board,
            container(panel)
                .width(PANEL_WIDTH)
                .height(Length::Fill)
                .padding(15),
        ]
        .spacing(20)
        .padding(20)
        .into()
    }

    /// Render the control panel
    fn control_panel(&self) -> Element<'_, Message> {
        let player_types = vec![PlayerType::Human, PlayerType::Neural];

        // Game controls
        let new_game_btn = button(text("New Game"))
            .on_press(Message::NewGame)
            .style(button::primary)
            .width(Length::Fill);

        let flip_btn = button(text("Flip Board"))
            .on_press(Message::FlipBoard)
            .style(button::secondary)
            .width(Length::Fill);

        // Player selection
        let white_picker = pick_list(
            player_types.clone(),
            Some(self.white_player),
            Message::WhitePlayerChanged,
        )
        .width(Length::Fill);

        let black_picker = pick_list(
            player_types,
            Some(self.black_player),
            Message::BlackPlayerChanged,
        )
        .width(Length::Fill);

        let status_text = text(self.status_line()).size(16);

        // Promotion choice, shown only while a promotion is pending
        let promotion: Element<'_, Message> = if self.session.pending_promotion.is_some() {
            column![
                text("Promote pawn to:").size(14),
                row![
                    promotion_button("Queen", Role::Queen),
                    promotion_button("Rook", Role::Rook),
                    promotion_button("Bishop", Role::Bishop),
                    promotion_button("Knight", Role::Knight),
                ]
                .spacing(5),
            ]
            .spacing(5)
            .into()
        } else {
            column![].into()
        };

        // Move history
        let moves_title = text("Moves").size(16);
        let mut moves_list = column![].spacing(2);

        for (i, chunk) in self.session.moves.chunks(2).enumerate() {
            let white_move = chunk[0].as_str();
            let black_move = chunk.get(1).map(String::as_str).unwrap_or("");
            moves_list =
                moves_list.push(text(format!("{}. {} {}", i + 1, white_move, black_move)).size(13));
        }

        let moves_scroll = scrollable(moves_list).height(Length::Fill);

        column![
            new_game_btn,
            flip_btn,
            vertical_space().height(20),
            text("White Player").size(14),
            white_picker,
            vertical_space().height(10),
            text("Black Player").size(14),
            black_picker,
            vertical_space().height(20),
            horizontal_rule(1),
            vertical_space().height(10),
            status_text,
            promotion,
            vertical_space().height(20),
            horizontal_rule(1),
            vertical_space().height(10),
            moves_title,
            moves_scroll,
        ]
        .spacing(5)
        .into()
    }

    fn status_line(&self) -> String {
        if let Some(err) = &self.engine_error {
            return format!("Engine error: {}", err);
        }

        match self.session.outcome {
            GameOutcome::Ongoing => {
                if self.engine_task_running {
                    "Engine thinking...".to_string()
                } else {
                    let side = if self.session.position.turn() == Color::White {
                        "White"
                    } else {
                        "Black"
                    };
                    if self.session.in_check {
                        format!("{} to move (check!)", side)
                    } else {
                        format!("{} to move", side)
                    }
                }
            }
            GameOutcome::Checkmate(Color::White) => "Checkmate! White wins".to_string(),
            GameOutcome::Checkmate(Color::Black) => "Checkmate! Black wins".to_string(),
            GameOutcome::Stalemate => "Stalemate".to_string(),
            GameOutcome::Draw => "Draw".to_string(),
        }
    }
}

/// Create a promotion choice button
fn promotion_button(label: &str, role: Role) -> Element<'_, Message> {
    button(text(label.to_string()).size(13))
        .on_press(Message::PromotionChosen(role))
        .style(button::secondary)
        .into()
}
