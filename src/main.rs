use clap::Parser;
use hackathon_teams::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Serve(args)) => cli::serve::run(args).await,
        Some(Command::Migrate(args)) => cli::migrate::run(args).await,
        None => cli::serve::run(cli::ServeArgs::default()).await,
    }
}
