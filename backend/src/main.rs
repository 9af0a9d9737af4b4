use backend::{api, build_session, config};

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "backend", about = "Play chess against the computer over HTTP")]
struct Args {
    #[command(flatten)]
    config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_tracing();

    let config = Args::parse().config;
    let session = build_session(&config).await?;

    let app = api::router(session);
    let addr = config.bind_addr()?;
    info!("[API] Listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
