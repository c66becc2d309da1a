//! Offline clue authoring pipeline.
//!
//! Each step is a one-shot batch job over the shared store:
//! - [`ingest`]: pull now-playing titles from the catalog and refresh `movies`
//! - [`apply`]: generate clues with the language model and write them to `clues`
//! - [`review`]: preview generated clues or audit stored ones without writing
//!
//! Every step records its parameters, metrics and artifacts through a
//! [`tracking::RunTracker`].

pub mod apply;
pub mod clues;
pub mod config;
pub mod error;
pub mod ingest;
pub mod review;
pub mod stats;
pub mod tracking;
