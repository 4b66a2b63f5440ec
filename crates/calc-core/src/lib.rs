//! Core of the calc self-updater.
//!
//! - [`resolver`] picks the newest same-channel release for the running version
//! - [`manifest`] fetches the release catalog
//! - [`io`] downloads, validates and installs a release binary
//! - [`update`] sequences the above and reports through a [`Reporter`]

pub mod io;
pub mod manifest;
pub mod paths;
pub mod permissions;
pub mod resolver;
pub mod update;

pub mod reporter;

pub use io::{AcquisitionError, InstallOptions, InstallReport, Installer};
pub use manifest::{HttpManifestSource, ManifestError, ReleaseSource, StaticSource};
pub use permissions::PermissionSet;
pub use reporter::{NullReporter, Reporter};
pub use resolver::{UpdateDecision, resolve};
pub use update::{
    AssumeYes, Prompt, UpdateCheck, UpdateContext, UpdateOutcome, check_for_update, run_update,
};

/// User Agent string for manifest and binary requests
pub const USER_AGENT: &str = concat!("calc-core/", env!("CARGO_PKG_VERSION"));
