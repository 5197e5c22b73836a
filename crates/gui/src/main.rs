//! Chess GUI application entry point

mod app;
mod board;
mod session;
mod styles;

use std::path::Path;
use std::sync::Arc;

use app::ChessApp;

fn main() -> iced::Result {
    // The trained artifacts are required; a missing or corrupt move codec
    // or model is a startup failure, not something to play through.
    let policy = match chess_policy::load_policy(Path::new("data")) {
        Ok(policy) => Arc::new(policy),
        Err(e) => {
            eprintln!("Failed to load policy artifacts from data/: {}", e);
            eprintln!("Run prepare_data and train a model first.");
            std::process::exit(1);
        }
    };

    iced::application("Policy Chess", ChessApp::update, ChessApp::view)
        .theme(ChessApp::theme)
        .window_size((920.0, 640.0))
        .run_with(move || ChessApp::new(policy))
}
