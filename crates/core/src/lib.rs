//! Domain types and pure game logic shared by the API server and the
//! clue authoring pipeline.

pub mod error;
pub mod game;
pub mod slug;
pub mod types;
