//! calc - command line calculator
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! This crate is the host binary for the self-update subsystem in
//! `calc-core`: it wires the HTTP manifest source, the terminal reporter and
//! the interactive prompt into the update flow.
//!
//! # Update channels
//!
//! An installation stays on the channel of the version it runs. Pre-release
//! installations only receive updates once opted in:
//!
//! ```text
//! CALC_ALLOW_ALPHA=1   deliver updates to -alpha builds
//! CALC_ALLOW_BETA=1    deliver updates to -beta builds
//! ```

pub mod cmd;
pub mod ui;

pub use calc_core::USER_AGENT;
pub use calc_core::manifest::DEFAULT_MANIFEST_URL;

/// Version this binary was built as (see `build.rs`).
pub const VERSION: &str = env!("CALC_VERSION");

/// UTC build timestamp (see `build.rs`).
pub const BUILD_TIME: &str = env!("CALC_BUILD_TIME");

/// `--version` text: version and build time.
pub const LONG_VERSION: &str = concat!(
    env!("CALC_VERSION"),
    " (built ",
    env!("CALC_BUILD_TIME"),
    ")"
);

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "calc")]
#[command(author, version = LONG_VERSION, about = "calc - command line calculator")]
pub struct Cli {
    /// Report what would happen without installing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Release manifest URL
    #[arg(
        long,
        global = true,
        env = "CALC_MANIFEST_URL",
        default_value = DEFAULT_MANIFEST_URL
    )]
    pub manifest_url: String,

    /// Platform key to download for (linux, darwin, windows)
    #[arg(long, global = true, env = "CALC_PLATFORM")]
    pub platform: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check for a newer release without installing it
    Check,
    /// Download and install the newest release for this channel
    SelfUpdate {
        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_includes_build_time() {
        assert!(LONG_VERSION.starts_with(VERSION));
        assert!(LONG_VERSION.ends_with(&format!("(built {BUILD_TIME})")));
        assert!(Cli::command().render_version().contains(BUILD_TIME));
    }

    #[test]
    fn test_parse_self_update() {
        let cli = Cli::parse_from(["calc", "--dry-run", "self-update", "-y"]);
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Some(Commands::SelfUpdate { yes: true })));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "calc",
            "check",
            "--manifest-url",
            "http://localhost/version.json",
            "--platform",
            "darwin",
        ]);
        assert!(matches!(cli.command, Some(Commands::Check)));
        assert_eq!(cli.manifest_url, "http://localhost/version.json");
        assert_eq!(cli.platform.as_deref(), Some("darwin"));
    }

    #[test]
    fn test_no_subcommand_is_startup_check() {
        let cli = Cli::parse_from(["calc"]);
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
    }
}
