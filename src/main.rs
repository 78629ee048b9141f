use clap::Parser;
use conduit_accounts::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli::run(cli).await
}
