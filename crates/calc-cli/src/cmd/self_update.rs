//! Self-update command for calc
use anyhow::{Context, Result};
use calc_core::update::AssumeYes;
use calc_core::{
    HttpManifestSource, Installer, PermissionSet, Prompt, UpdateContext, UpdateOutcome, run_update,
};

use super::Settings;
use crate::ui::{Output, StdinPrompt};

/// Update calc itself.
///
/// Every outcome other than a startup failure is reported and returns `Ok`;
/// after a successful install the process should simply exit.
pub async fn self_update(settings: &Settings, yes: bool) -> Result<()> {
    let exe = calc_core::paths::current_exe().context("Failed to locate the running executable")?;
    let client = super::http_client()?;

    let source = HttpManifestSource::new(client.clone(), settings.manifest_url.clone());
    let installer = Installer::new(client, Output::new(settings.quiet));
    let prompt: &dyn Prompt = if yes { &AssumeYes } else { &StdinPrompt };

    let ctx = UpdateContext {
        current_version: crate::VERSION,
        platform: &settings.platform,
        exe_path: &exe,
        permissions: PermissionSet::from_env(),
        build_time: Some(crate::BUILD_TIME),
        dry_run: settings.dry_run,
    };

    match run_update(&source, &installer, prompt, &ctx).await {
        UpdateOutcome::Installed(report) => {
            tracing::info!(
                version = %report.installed_version,
                backup = %report.backup_path.display(),
                "self-update installed"
            );
        }
        outcome => tracing::debug!(?outcome, "self-update finished"),
    }
    Ok(())
}
