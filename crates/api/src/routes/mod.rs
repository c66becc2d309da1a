pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Game routes, mounted at the root.
///
/// ```text
/// /today-game     GET    current puzzle, first clue
/// /guess          POST   evaluate a guess
/// ```
pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/today-game", get(handlers::game::today_game))
        .route("/guess", post(handlers::game::submit_guess))
}
