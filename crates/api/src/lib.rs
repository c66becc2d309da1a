//! CinemaToday game service library.
//!
//! Exposes config, state, error handling, handlers and the router so the
//! binary entrypoint and the integration tests build the same application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
