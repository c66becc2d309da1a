//! Read interface used by the game service.
//!
//! [`GameStore`] hides where puzzles come from. [`PgGameStore`] reads the
//! `movies` and `clues` tables; [`FixedGameStore`] serves a single built-in
//! puzzle and needs no database, which is what the HTTP tests run against.

use async_trait::async_trait;
use cinematoday_core::game::{Puzzle, PuzzleClue};

use crate::models::clue::Clue;
use crate::models::movie::Movie;
use crate::repositories::{ClueRepo, MovieRepo};
use crate::DbPool;

/// Source of puzzles for the game service.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Any one movie eligible for today's game, with its clues.
    async fn random_active_puzzle(&self) -> Result<Option<Puzzle>, sqlx::Error>;

    /// The movie identified by `slug`, with its clues.
    async fn puzzle_by_slug(&self, slug: &str) -> Result<Option<Puzzle>, sqlx::Error>;
}

/// Postgres-backed store.
///
/// Each call checks out one pooled connection for both of its queries; the
/// connection goes back to the pool when it is dropped, on every exit path.
#[derive(Clone)]
pub struct PgGameStore {
    pool: DbPool,
}

impl PgGameStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_clues(
        conn: &mut sqlx::PgConnection,
        movie: Option<Movie>,
    ) -> Result<Option<Puzzle>, sqlx::Error> {
        let Some(movie) = movie else {
            return Ok(None);
        };
        let clues = ClueRepo::list_for_movie(&mut *conn, movie.id).await?;
        tracing::debug!(movie_id = movie.id, clue_count = clues.len(), "Loaded puzzle");
        Ok(Some(into_puzzle(movie, clues)))
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn random_active_puzzle(&self) -> Result<Option<Puzzle>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let movie = MovieRepo::random_active(&mut *conn).await?;
        Self::with_clues(&mut *conn, movie).await
    }

    async fn puzzle_by_slug(&self, slug: &str) -> Result<Option<Puzzle>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        let movie = MovieRepo::find_by_slug(&mut *conn, slug).await?;
        Self::with_clues(&mut *conn, movie).await
    }
}

/// Assemble a [`Puzzle`] from a movie row and its position-ordered clues.
pub fn into_puzzle(movie: Movie, clues: Vec<Clue>) -> Puzzle {
    Puzzle {
        slug: movie.slug,
        title: movie.title,
        poster_url: movie.poster_url,
        clues: clues
            .into_iter()
            .map(|c| PuzzleClue {
                position: c.order_index,
                text: c.text,
            })
            .collect(),
    }
}

/// In-memory store that always serves the same puzzle.
#[derive(Debug, Clone)]
pub struct FixedGameStore {
    puzzle: Puzzle,
}

impl FixedGameStore {
    pub fn new(puzzle: Puzzle) -> Self {
        Self { puzzle }
    }

    /// The built-in "Jaws" puzzle.
    pub fn jaws() -> Self {
        let clues = [
            "A quiet seaside community learns that its summer prosperity depends on ignoring a danger nobody can see.",
            "A local lawman who is afraid of the water clashes with officials who refuse to close the beaches.",
            "An oceanographer and a grizzled fisherman join the hunt when attacks keep spoiling the holiday season.",
            "Two ominous notes on a cello warn that a great white is circling Amity Island.",
        ];
        Self::new(Puzzle {
            slug: "jaws-1975".into(),
            title: "Jaws".into(),
            poster_url: None,
            clues: clues
                .iter()
                .enumerate()
                .map(|(i, text)| PuzzleClue {
                    position: i as i32,
                    text: (*text).to_string(),
                })
                .collect(),
        })
    }
}

impl Default for FixedGameStore {
    fn default() -> Self {
        Self::jaws()
    }
}

#[async_trait]
impl GameStore for FixedGameStore {
    async fn random_active_puzzle(&self) -> Result<Option<Puzzle>, sqlx::Error> {
        Ok(Some(self.puzzle.clone()))
    }

    async fn puzzle_by_slug(&self, slug: &str) -> Result<Option<Puzzle>, sqlx::Error> {
        Ok((self.puzzle.slug == slug).then(|| self.puzzle.clone()))
    }
}
