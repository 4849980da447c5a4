use anyhow::Result;
use clap::{Parser, Subcommand};
use forum_backend::api;
use forum_backend::config::ForumConfig;
use forum_backend::database::Database;
use forum_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "Forum backend daemon")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST and WebSocket access
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();

    let config = ForumConfig::from_env()?;
    config.paths.ensure_directories()?;
    let database = Database::connect(&config.paths)?;
    database.ensure_migrations()?;
    tracing::info!(db_path = ?config.paths.db_path, "database ready");

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(config, database).await,
    }
}
