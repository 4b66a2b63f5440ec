//! calc CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use calc_cli::cmd::{self, Settings};
use calc_cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli);

    match cli.command {
        // Start-up hook: offer any pending update before the calculator runs.
        None => cmd::self_update::self_update(&settings, false).await,
        Some(Commands::Check) => cmd::check::check(&settings).await,
        Some(Commands::SelfUpdate { yes }) => cmd::self_update::self_update(&settings, yes).await,
    }
}
