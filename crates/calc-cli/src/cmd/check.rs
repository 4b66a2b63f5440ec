//! `calc check`
use anyhow::Result;
use calc_core::{HttpManifestSource, PermissionSet, Reporter, UpdateCheck, check_for_update};

use super::Settings;
use crate::ui::Output;

/// Report whether an update is available, without installing it.
pub async fn check(settings: &Settings) -> Result<()> {
    let output = Output::new(settings.quiet);
    let source = HttpManifestSource::new(super::http_client()?, settings.manifest_url.clone());

    let check = check_for_update(&source, crate::VERSION, &PermissionSet::from_env()).await;
    check.report(&output);

    if let UpdateCheck::Available(_) = check {
        output.info("Run `calc self-update` to install it.");
    }
    Ok(())
}
