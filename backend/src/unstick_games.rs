//! Apply the pending opponent reply to games left waiting on it
//!
//! A game can be stuck on the computer's turn if the server went away between
//! the human move and the reply. This finds such games and plays one reply in
//! each.

use backend::{build_session, config};
use clap::Parser;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "unstick-games", about = "Play pending computer replies")]
struct Args {
    /// Only look at these games
    #[arg(long = "game-id")]
    game_ids: Vec<Uuid>,

    /// List the stuck games without changing them
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[command(flatten)]
    config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    config::init_tracing();

    let args = Args::parse();
    let session = build_session(&args.config).await?;

    let stuck: Vec<_> = session
        .list_games()
        .await?
        .into_iter()
        .filter(|game| args.game_ids.is_empty() || args.game_ids.contains(&game.id()))
        .filter(|game| session.is_reply_due(game))
        .collect();
    info!("[SESSION] {} game(s) waiting on a reply", stuck.len());

    let mut failures = 0;
    for game in stuck {
        if args.dry_run {
            println!("{} {} ({} moves)", game.id(), game.record.name, game.record.move_count());
            continue;
        }
        match session.reply_if_due(game.id()).await {
            Ok(Some(reply)) => println!("{} {}", game.id(), reply.applied.code),
            Ok(None) => println!("{} no reply needed", game.id()),
            Err(e) => {
                error!("[SESSION] Could not unstick {}: {}", game.id(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} game(s) could not be unstuck");
    }
    Ok(())
}
