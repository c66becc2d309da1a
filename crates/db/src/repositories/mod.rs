//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that take a Postgres executor (pool, connection or transaction) as the
//! first argument.

pub mod clue_repo;
pub mod daily_selection_repo;
pub mod movie_repo;

pub use clue_repo::ClueRepo;
pub use daily_selection_repo::DailySelectionRepo;
pub use movie_repo::MovieRepo;
