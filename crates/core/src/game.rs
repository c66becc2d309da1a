//! Guess checking and clue progression.
//!
//! The game is stateless on the server: the client echoes back the index of
//! the clue it is currently showing and every guess is evaluated from
//! scratch against the stored title and clue list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Message returned with a correct guess.
pub const MSG_CORRECT: &str = "Nice! You got it right.";

/// Message returned with a wrong guess when another clue is available.
pub const MSG_NEXT_CLUE: &str = "Nope, have another clue.";

/// One clue of a puzzle, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleClue {
    /// Zero-based position of the clue within its movie.
    pub position: i32,
    pub text: String,
}

/// A movie together with its ordered clues, as read by the game service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub slug: String,
    pub title: String,
    pub poster_url: Option<String>,
    /// Sorted by ascending `position`.
    pub clues: Vec<PuzzleClue>,
}

/// Response payload for `GET /today-game`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayGame {
    pub game_date: NaiveDate,
    pub movie_slug: String,
    pub total_clues: usize,
    pub current_clue_index: i32,
    pub current_clue_text: String,
    pub solved: bool,
    pub poster_url: Option<String>,
}

/// Request payload for `POST /guess`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuessRequest {
    pub movie_slug: String,
    pub guess: String,
    /// Index of the clue the client is currently displaying. Signed so that
    /// out-of-range values reach validation instead of failing to parse.
    pub current_clue_index: i64,
}

/// Response payload for `POST /guess`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessResponse {
    pub correct: bool,
    pub finished: bool,
    pub next_clue_index: i64,
    pub next_clue_text: Option<String>,
    pub reveal_title: Option<String>,
    pub reveal_poster_url: Option<String>,
    pub message: String,
}

/// Case-fold and strip every non-alphanumeric character.
///
/// `"Jaws!!!"`, `"  jaws "` and `"JAWS"` all normalise to `"jaws"`.
pub fn normalize_title(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `guess` names `title` once both are normalised.
pub fn is_correct_guess(title: &str, guess: &str) -> bool {
    normalize_title(guess) == normalize_title(title)
}

impl Puzzle {
    /// Build the opening state of the game: the first clue, unsolved.
    ///
    /// Fails with [`CoreError::Integrity`] when the puzzle has no clues.
    pub fn opening(&self, game_date: NaiveDate) -> Result<TodayGame, CoreError> {
        let first = self
            .clues
            .first()
            .ok_or_else(|| CoreError::Integrity("No clues for selected movie.".into()))?;

        Ok(TodayGame {
            game_date,
            movie_slug: self.slug.clone(),
            total_clues: self.clues.len(),
            current_clue_index: first.position,
            current_clue_text: first.text.clone(),
            solved: false,
            poster_url: self.poster_url.clone(),
        })
    }

    /// Evaluate a guess made while clue `current_index` is shown.
    ///
    /// Checks, in order: the puzzle has clues, the index is in range, the
    /// guess matches, another clue remains. A finished game is not
    /// remembered, so the same call can be repeated indefinitely.
    pub fn judge(&self, guess: &str, current_index: i64) -> Result<GuessResponse, CoreError> {
        if self.clues.is_empty() {
            return Err(CoreError::Integrity("No clues for this movie.".into()));
        }

        let count = self.clues.len() as i64;
        if current_index < 0 || current_index >= count {
            return Err(CoreError::Validation("Invalid clue index.".into()));
        }

        if is_correct_guess(&self.title, guess) {
            return Ok(self.reveal(true, current_index, MSG_CORRECT.to_string()));
        }

        let next_index = current_index + 1;
        if next_index < count {
            let next = &self.clues[next_index as usize];
            return Ok(GuessResponse {
                correct: false,
                finished: false,
                next_clue_index: next_index,
                next_clue_text: Some(next.text.clone()),
                reveal_title: None,
                reveal_poster_url: None,
                message: MSG_NEXT_CLUE.to_string(),
            });
        }

        let message = format!("Out of clues! The film was {}.", self.title);
        Ok(self.reveal(false, current_index, message))
    }

    fn reveal(&self, correct: bool, current_index: i64, message: String) -> GuessResponse {
        GuessResponse {
            correct,
            finished: true,
            next_clue_index: current_index,
            next_clue_text: None,
            reveal_title: Some(self.title.clone()),
            reveal_poster_url: self.poster_url.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn jaws() -> Puzzle {
        Puzzle {
            slug: "jaws-1975".into(),
            title: "Jaws".into(),
            poster_url: Some("https://example.com/jaws.jpg".into()),
            clues: (0..4)
                .map(|i| PuzzleClue {
                    position: i,
                    text: format!("clue {i}"),
                })
                .collect(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_title("Jaws!!!"), "jaws");
        assert_eq!(normalize_title("  jaws "), "jaws");
        assert_eq!(normalize_title("JAWS"), "jaws");
        assert_eq!(normalize_title("Spider-Man: No Way Home"), "spidermannowayhome");
    }

    #[test]
    fn normalize_keeps_digits_and_unicode_letters() {
        assert_eq!(normalize_title("2001: A Space Odyssey"), "2001aspaceodyssey");
        assert_eq!(normalize_title("Amélie"), "amélie");
    }

    #[test]
    fn punctuation_only_variants_are_indistinguishable() {
        assert!(is_correct_guess("Se7en", "se 7 en"));
        assert!(!is_correct_guess("Jaws", "Jaws 2"));
    }

    #[test]
    fn opening_shows_first_clue_unsolved() {
        let game = jaws().opening(date()).unwrap();
        assert_eq!(game.movie_slug, "jaws-1975");
        assert_eq!(game.total_clues, 4);
        assert_eq!(game.current_clue_index, 0);
        assert_eq!(game.current_clue_text, "clue 0");
        assert!(!game.solved);
        assert_eq!(game.poster_url.as_deref(), Some("https://example.com/jaws.jpg"));
    }

    #[test]
    fn opening_without_clues_is_integrity_error() {
        let mut puzzle = jaws();
        puzzle.clues.clear();
        assert_matches!(puzzle.opening(date()), Err(CoreError::Integrity(_)));
    }

    #[test]
    fn wrong_guess_advances_to_next_clue() {
        let puzzle = jaws();
        for i in 0..3 {
            let res = puzzle.judge("shark movie", i).unwrap();
            assert!(!res.correct);
            assert!(!res.finished);
            assert_eq!(res.next_clue_index, i + 1);
            assert_eq!(res.next_clue_text, Some(format!("clue {}", i + 1)));
            assert_eq!(res.reveal_title, None);
            assert_eq!(res.reveal_poster_url, None);
            assert_eq!(res.message, MSG_NEXT_CLUE);
        }
    }

    #[test]
    fn wrong_guess_on_last_clue_reveals_answer() {
        let res = jaws().judge("Titanic", 3).unwrap();
        assert!(!res.correct);
        assert!(res.finished);
        assert_eq!(res.next_clue_index, 3);
        assert_eq!(res.next_clue_text, None);
        assert_eq!(res.reveal_title.as_deref(), Some("Jaws"));
        assert_eq!(res.reveal_poster_url.as_deref(), Some("https://example.com/jaws.jpg"));
        assert_eq!(res.message, "Out of clues! The film was Jaws.");
    }

    #[test]
    fn correct_guess_finishes_at_any_index() {
        let puzzle = jaws();
        for i in 0..4 {
            let res = puzzle.judge("  JAWS!! ", i).unwrap();
            assert!(res.correct);
            assert!(res.finished);
            assert_eq!(res.next_clue_index, i);
            assert_eq!(res.next_clue_text, None);
            assert_eq!(res.reveal_title.as_deref(), Some("Jaws"));
            assert_eq!(res.message, MSG_CORRECT);
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let puzzle = jaws();
        assert_matches!(puzzle.judge("Jaws", -1), Err(CoreError::Validation(_)));
        assert_matches!(puzzle.judge("Jaws", 4), Err(CoreError::Validation(_)));
    }

    #[test]
    fn no_clues_is_checked_before_index() {
        let mut puzzle = jaws();
        puzzle.clues.clear();
        assert_matches!(puzzle.judge("Jaws", 99), Err(CoreError::Integrity(_)));
    }

    #[test]
    fn guess_sequence_reaches_win() {
        let puzzle = jaws();

        let first = puzzle.judge("shark", 0).unwrap();
        assert_eq!((first.correct, first.finished, first.next_clue_index), (false, false, 1));

        let second = puzzle.judge("ocean", first.next_clue_index).unwrap();
        assert_eq!((second.correct, second.finished, second.next_clue_index), (false, false, 2));

        let third = puzzle.judge("Jaws", second.next_clue_index).unwrap();
        assert!(third.correct);
        assert!(third.finished);
        assert_eq!(third.reveal_title.as_deref(), Some("Jaws"));
    }

    #[test]
    fn finished_game_can_be_replayed() {
        let puzzle = jaws();
        let first = puzzle.judge("Jaws", 2).unwrap();
        let again = puzzle.judge("Jaws", 2).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn missing_fields_serialize_as_null() {
        let res = jaws().judge("nope", 0).unwrap();
        let json = serde_json::to_value(&res).unwrap();
        assert!(json["reveal_title"].is_null());
        assert!(json["reveal_poster_url"].is_null());
        assert_eq!(json["next_clue_index"], 1);
    }
}
