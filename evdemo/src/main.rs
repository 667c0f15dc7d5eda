use ev_axum::{ApiApplication, config::AxumConfig, start_server};
use ev_core::{
    admission::format_author, models::VoterToken, ports::ContestRepository, session::Session,
};
use ev_local::LocalStore;
use ev_sqlite::Db;
use evdemo::{AppConfig, Cli, Commands, Poller, StorageMode, impls::DemoApp};
use jwt_simple::prelude::HS256Key;
use tracing::{Level, event};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // By convention, we leverage `tracing` to instrument and log various
    // operations throughout this project.
    // Accordingly, we likely want to subscribe to these events so we can
    // write them to stdio and possibly some durable location.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::import()?;
    let key = cli
        .secret
        .as_ref()
        .map(|secret| HS256Key::from_bytes(secret.as_bytes()));

    // Create config with proper layering of CLI args
    let AppConfig {
        server,
        storage,
        poll,
    } = AppConfig::load(&cli)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let key = key.ok_or_else(|| anyhow::anyhow!("serving requires a secret"))?;
            match storage.mode {
                StorageMode::Local => {
                    let db = LocalStore::open(&storage.local).await?;
                    serve(server, DemoApp { db, key }).await
                }
                StorageMode::Shared => {
                    let db = Db::open(&storage.shared).await?;
                    serve(server, DemoApp { db, key }).await
                }
            }
        }

        Commands::Watch { voter } => {
            let voter = voter.unwrap_or_else(VoterToken::random);
            let size = server.leaderboard_size;
            match storage.mode {
                StorageMode::Local => {
                    let db = LocalStore::open(&storage.local).await?;
                    watch(&poll, db, voter, size).await
                }
                StorageMode::Shared => {
                    let db = Db::open(&storage.shared).await?;
                    watch(&poll, db, voter, size).await
                }
            }
        }

        Commands::Token { admin, hours } => {
            let key = key.ok_or_else(|| anyhow::anyhow!("minting a token requires a secret"))?;
            println!("{}", evdemo::impls::mint_token(&key, admin, hours)?);
            Ok(())
        }
    }
}

async fn serve<T: ApiApplication>(config: AxumConfig, app: T) -> anyhow::Result<()> {
    start_server(config, app).await?;
    Ok(())
}

/// Refresh a session on every tick and log the leaderboard. A failed refresh
/// is logged and the previous snapshot kept until the next tick.
async fn watch<R: ContestRepository>(
    poll: &Poller,
    db: R,
    voter: VoterToken,
    size: usize,
) -> anyhow::Result<()> {
    event!(Level::INFO, voter = %voter, every = ?poll.every, "watching");
    let mut session = Session::new(db, voter);

    poll.run(async |tick| {
        if let Err(err) = session.refresh().await {
            event!(Level::WARN, tick, err = err.to_string(), "refresh failed");
            return Ok::<(), anyhow::Error>(());
        }

        let board = session.leaderboard(size);
        event!(
            Level::INFO,
            tick,
            submissions = session.submissions().len(),
            categories = session.categories().len(),
            "refreshed"
        );
        for (rank, submission) in board.iter().enumerate() {
            event!(
                Level::INFO,
                rank = rank + 1,
                votes = submission.vote_count,
                category = %submission.category.display_name(),
                author = %format_author(&submission.author),
                mine = ?session.my_vote(submission.id),
                "{}",
                submission.caption
            );
        }
        Ok(())
    })
    .await
}
