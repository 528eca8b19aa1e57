use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use verscout_common::observability::init_logging;

mod cli;
mod workflows;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (flags > env > file > defaults)
    let cfg = cli.load_config()?;

    let log_path = init_logging(cfg.logging.to_log_config())?;
    tracing::debug!(log = %log_path.display(), command = ?cli.command, "verscout starting");

    match cli.command {
        Command::Check => workflows::check(&cfg).await,
        Command::Snapshot => workflows::snapshot(&cfg).await,
        Command::Crawl => workflows::crawl(&cfg).await,
    }
}
