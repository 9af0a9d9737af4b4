//! Server configuration
//!
//! Flags with environment fallbacks; a `.env` file is loaded first by the
//! binaries.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
pub struct Config {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:chess.db")]
    pub database_url: String,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Engine command line, e.g. `/usr/games/stockfish` or `gnuchess --uci`;
    /// when unset, known engines are looked up on PATH
    #[arg(long, env = "CHESS_ENGINE")]
    pub engine: Option<String>,

    /// Hard limit on one engine request, independent of the per-game think time
    #[arg(long, env = "ENGINE_TIMEOUT_MS", default_value_t = 5000)]
    pub engine_timeout_ms: u64,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

impl Config {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }
}

/// `RUST_LOG` if set, otherwise `info`
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
