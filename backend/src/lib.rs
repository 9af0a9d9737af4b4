pub mod api;
pub mod board_page;
pub mod config;
pub mod error;
pub mod store;

use chess_session::{GameSession, OpponentPolicy};
use std::sync::Arc;
use store::SqliteStore;

/// Open the store and pick the move generator, once per process
pub async fn build_session(config: &config::Config) -> anyhow::Result<Arc<GameSession>> {
    let store = SqliteStore::connect(&config.database_url, config.max_connections).await?;
    let generator = uci_opponent::discover(config.engine.as_deref(), config.engine_timeout());
    let policy = OpponentPolicy::new(generator);
    Ok(Arc::new(GameSession::new(Arc::new(store), policy)))
}
