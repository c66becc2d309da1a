//! Handlers for the daily guessing game.
//!
//! The server keeps no per-player state: `today_game` hands out the first
//! clue and `submit_guess` re-evaluates each guess from the request alone.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use cinematoday_core::error::CoreError;
use cinematoday_core::game::{GuessRequest, GuessResponse, TodayGame};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /today-game
///
/// Pick an active movie and return its first clue. The date is the
/// server's current UTC date.
pub async fn today_game(State(state): State<AppState>) -> AppResult<Json<TodayGame>> {
    let puzzle = state
        .store
        .random_active_puzzle()
        .await?
        .ok_or_else(|| CoreError::NotFound("No movies available.".into()))?;

    let game = puzzle.opening(Utc::now().date_naive())?;
    tracing::debug!(
        slug = %game.movie_slug,
        total_clues = game.total_clues,
        "Serving today's game"
    );

    Ok(Json(game))
}

/// POST /guess
pub async fn submit_guess(
    State(state): State<AppState>,
    Json(input): Json<GuessRequest>,
) -> AppResult<Json<GuessResponse>> {
    let puzzle = state
        .store
        .puzzle_by_slug(&input.movie_slug)
        .await?
        .ok_or_else(|| AppError::BadRequest("Unknown movie slug.".into()))?;

    let response = puzzle.judge(&input.guess, input.current_clue_index)?;
    tracing::debug!(
        slug = %puzzle.slug,
        index = input.current_clue_index,
        correct = response.correct,
        finished = response.finished,
        "Guess evaluated"
    );

    Ok(Json(response))
}
