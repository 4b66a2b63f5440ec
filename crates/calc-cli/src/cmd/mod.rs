//! Subcommand implementations.

pub mod check;
pub mod self_update;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::Cli;

/// Options shared by every command, resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub manifest_url: String,
    pub platform: String,
    pub dry_run: bool,
    pub quiet: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            manifest_url: cli.manifest_url.clone(),
            platform: cli
                .platform
                .clone()
                .unwrap_or_else(|| calc_schema::platform::current().to_string()),
            dry_run: cli.dry_run,
            quiet: cli.quiet,
        }
    }
}

pub(crate) fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(crate::USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}
