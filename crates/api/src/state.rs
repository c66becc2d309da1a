use std::sync::Arc;

use cinematoday_db::store::GameStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Source of puzzles (Postgres or the built-in fixed puzzle).
    pub store: Arc<dyn GameStore>,
    pub config: Arc<ServerConfig>,
}
