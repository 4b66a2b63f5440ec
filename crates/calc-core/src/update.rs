//! Update orchestration: fetch the catalog, resolve, ask, install.
//!
//! Nothing here is fatal. Every failure ends the update attempt for this run
//! with one status line and the host carries on.

use std::path::Path;

use calc_schema::{Channel, Permission, Release};

use crate::io::{AcquisitionError, InstallReport, Installer};
use crate::manifest::{ManifestError, ReleaseSource};
use crate::permissions::PermissionSet;
use crate::resolver::resolve;
use crate::Reporter;

/// Asks the user whether to install an available release.
pub trait Prompt {
    /// Return true to install `release`.
    fn confirm_update(&self, release: &Release) -> bool;
}

/// Accepts every update (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm_update(&self, _: &Release) -> bool {
        true
    }
}

/// Result of looking for an update, before anything is installed.
#[derive(Debug)]
pub enum UpdateCheck {
    /// The catalog host could not be reached.
    Offline,
    /// The catalog was reached but unusable.
    Failed(ManifestError),
    /// No newer release on this channel.
    UpToDate,
    /// A newer same-channel release exists but its permission is not set.
    Gated {
        /// The withheld release.
        release: Release,
        /// Channel of the running version.
        channel: Channel,
        /// Permission that would deliver it.
        permission: Permission,
    },
    /// A newer release may be installed.
    Available(Release),
}

impl UpdateCheck {
    /// Emit the single status line for this result.
    pub fn report(&self, reporter: &dyn Reporter) {
        match self {
            Self::Offline => {
                reporter.warning("No internet connection available, skipping update check");
            }
            Self::Failed(e) => reporter.warning(&format!("Update check failed: {e}")),
            Self::UpToDate => reporter.success("Everything is up to date!"),
            Self::Gated {
                release,
                channel,
                permission,
            } => reporter.warning(&gating_message(release, *channel, *permission)),
            Self::Available(release) => match release.released_at() {
                Some(at) => reporter.info(&format!(
                    "New version {} available (released {})",
                    release.version,
                    at.format("%Y-%m-%d")
                )),
                None => reporter.info(&format!("New version {} available", release.version)),
            },
        }
    }
}

/// Tell the user how to opt into a withheld pre-release.
pub fn gating_message(release: &Release, channel: Channel, permission: Permission) -> String {
    format!(
        "A newer {channel} release ({}) is available. Set {}=1 to receive it.",
        release.version,
        permission.env_var()
    )
}

/// Fetch the catalog from `source` and decide what, if anything, to offer.
pub async fn check_for_update(
    source: &dyn ReleaseSource,
    current_version: &str,
    permissions: &PermissionSet,
) -> UpdateCheck {
    let manifest = match source.fetch().await {
        Ok(manifest) => manifest,
        Err(e) if e.is_offline() => {
            tracing::debug!("manifest unreachable: {e}");
            return UpdateCheck::Offline;
        }
        Err(e) => return UpdateCheck::Failed(e),
    };

    let decision = resolve(current_version, &manifest.releases, permissions);
    match (
        decision.target,
        decision.current_channel,
        decision.required_permission,
    ) {
        (None, ..) => UpdateCheck::UpToDate,
        (Some(release), Some(channel), Some(permission)) if decision.gated => UpdateCheck::Gated {
            release,
            channel,
            permission,
        },
        (Some(release), ..) => UpdateCheck::Available(release),
    }
}

/// Everything the update flow needs to know about the running host.
#[derive(Debug, Clone)]
pub struct UpdateContext<'a> {
    /// Version text of the running build.
    pub current_version: &'a str,
    /// Manifest platform key (`linux`, `darwin`, `windows`).
    pub platform: &'a str,
    /// Executable to replace.
    pub exe_path: &'a Path,
    /// Pre-release opt-ins.
    pub permissions: PermissionSet,
    /// When the running build was made, shown in the completion line.
    pub build_time: Option<&'a str>,
    /// Report the decision but never prompt or install.
    pub dry_run: bool,
}

/// How an update attempt ended.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The executable was replaced; the process should exit.
    Installed(InstallReport),
    /// The user said no.
    Declined,
    /// No update was offered (up to date, gated, offline, dry run, bad catalog).
    NothingToDo,
    /// Acquisition aborted; the current executable is untouched.
    InstallFailed(AcquisitionError),
}

/// Final line after a successful install.
pub fn completion_message(ctx: &UpdateContext<'_>, installed_version: &str) -> String {
    let built = ctx
        .build_time
        .map(|at| format!(" (built {at})"))
        .unwrap_or_default();
    format!(
        "Update complete from {}{built} to {installed_version}. Please re-run the application.",
        ctx.current_version
    )
}

/// Run one full update attempt.
pub async fn run_update<R: Reporter>(
    source: &dyn ReleaseSource,
    installer: &Installer<R>,
    prompt: &dyn Prompt,
    ctx: &UpdateContext<'_>,
) -> UpdateOutcome {
    let reporter = installer.reporter();
    reporter.section("Checking for updates");

    let check = check_for_update(source, ctx.current_version, &ctx.permissions).await;
    check.report(reporter);

    let UpdateCheck::Available(release) = check else {
        return UpdateOutcome::NothingToDo;
    };

    if ctx.dry_run {
        reporter.info("Dry run, not installing update.");
        return UpdateOutcome::NothingToDo;
    }

    if !prompt.confirm_update(&release) {
        reporter.info("Update cancelled.");
        return UpdateOutcome::Declined;
    }

    reporter.section(&format!(
        "Updating current version from {} to {}",
        ctx.current_version, release.version
    ));

    match installer
        .install(&release, ctx.platform, ctx.exe_path, ctx.current_version)
        .await
    {
        Ok(report) => {
            reporter.success(&completion_message(ctx, &report.installed_version));
            UpdateOutcome::Installed(report)
        }
        Err(e) => {
            tracing::debug!("install aborted: {e:?}");
            reporter.error(&format!("Update failed: {e}"));
            reporter.info("The current installation was left untouched.");
            UpdateOutcome::InstallFailed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{HttpManifestSource, StaticSource};
    use std::cell::Cell;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Recorder {
        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, kind: &str, msg: &str) {
            self.0.lock().unwrap().push(format!("{kind}: {msg}"));
        }
    }

    impl Reporter for Recorder {
        fn section(&self, title: &str) {
            self.push("section", title);
        }
        fn downloading(&self, _: u64, _: Option<u64>) {}
        fn info(&self, msg: &str) {
            self.push("info", msg);
        }
        fn success(&self, msg: &str) {
            self.push("success", msg);
        }
        fn warning(&self, msg: &str) {
            self.push("warning", msg);
        }
        fn error(&self, msg: &str) {
            self.push("error", msg);
        }
    }

    struct Scripted {
        answer: bool,
        asked: Cell<usize>,
    }

    impl Scripted {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: Cell::new(0),
            }
        }
    }

    impl Prompt for Scripted {
        fn confirm_update(&self, _: &Release) -> bool {
            self.asked.set(self.asked.get() + 1);
            self.answer
        }
    }

    fn installer() -> Installer<Recorder> {
        Installer::new(reqwest::Client::new(), Recorder::default())
    }

    fn context<'a>(current_version: &'a str, exe: &'a Path) -> UpdateContext<'a> {
        UpdateContext {
            current_version,
            platform: "linux",
            exe_path: exe,
            permissions: PermissionSet::default(),
            build_time: None,
            dry_run: false,
        }
    }

    fn source(versions: &[&str]) -> StaticSource {
        StaticSource(versions.iter().map(|v| Release::new(*v)).collect())
    }

    #[test]
    fn test_completion_message() {
        let mut ctx = context("v1.0.0", Path::new("/usr/local/bin/calc"));
        assert_eq!(
            completion_message(&ctx, "v1.1.0"),
            "Update complete from v1.0.0 to v1.1.0. Please re-run the application."
        );

        ctx.build_time = Some("2025-06-01T12:00:00Z");
        assert_eq!(
            completion_message(&ctx, "v1.1.0"),
            "Update complete from v1.0.0 (built 2025-06-01T12:00:00Z) to v1.1.0. Please re-run the application."
        );
    }

    #[test]
    fn test_gating_message() {
        let release = Release::new("v1.1.0-beta");
        assert_eq!(
            gating_message(&release, Channel::Beta, Permission::AllowBeta),
            "A newer beta release (v1.1.0-beta) is available. Set CALC_ALLOW_BETA=1 to receive it."
        );
    }

    #[test]
    fn test_available_report_includes_release_date() {
        let recorder = Recorder::default();
        UpdateCheck::Available(Release::new("v2.0.0").with_release_date("2025-03-04T10:00:00Z"))
            .report(&recorder);
        UpdateCheck::Available(Release::new("v2.0.1")).report(&recorder);
        assert_eq!(
            recorder.lines(),
            vec![
                "info: New version v2.0.0 available (released 2025-03-04)",
                "info: New version v2.0.1 available",
            ]
        );
    }

    #[tokio::test]
    async fn test_check_variants() {
        let none = PermissionSet::default();

        let check = check_for_update(&source(&["v2.0.0"]), "v1.0.0", &none).await;
        assert!(matches!(check, UpdateCheck::Available(r) if r.version == "v2.0.0"));

        let check = check_for_update(&source(&["v0.9.0"]), "v1.0.0", &none).await;
        assert!(matches!(check, UpdateCheck::UpToDate));

        let check = check_for_update(&source(&["v1.1.0-beta"]), "v1.0.0-beta", &none).await;
        assert!(matches!(
            check,
            UpdateCheck::Gated {
                channel: Channel::Beta,
                permission: Permission::AllowBeta,
                ..
            }
        ));

        let check = check_for_update(&StaticSource::default(), "v1.0.0", &none).await;
        assert!(matches!(check, UpdateCheck::Failed(ManifestError::Empty)));
    }

    #[tokio::test]
    async fn test_unreachable_manifest_is_offline() {
        let source = HttpManifestSource::new(reqwest::Client::new(), "http://127.0.0.1:9/v.json")
            .with_timeout(Duration::from_secs(2));
        let check = check_for_update(&source, "v1.0.0", &PermissionSet::default()).await;
        assert!(matches!(check, UpdateCheck::Offline));
    }

    #[tokio::test]
    async fn test_up_to_date_does_not_prompt() {
        let installer = installer();
        let prompt = Scripted::new(true);
        let outcome = run_update(
            &source(&["v1.0.0"]),
            &installer,
            &prompt,
            &context("v1.0.0", Path::new("/nonexistent/calc")),
        )
        .await;

        assert!(matches!(outcome, UpdateOutcome::NothingToDo));
        assert_eq!(prompt.asked.get(), 0);
        assert!(installer
            .reporter()
            .lines()
            .contains(&"success: Everything is up to date!".to_string()));
    }

    #[tokio::test]
    async fn test_gated_update_reports_and_stops() {
        let installer = installer();
        let prompt = Scripted::new(true);
        let outcome = run_update(
            &source(&["v0.0.12-alpha"]),
            &installer,
            &prompt,
            &context("v0.0.10-alpha", Path::new("/nonexistent/calc")),
        )
        .await;

        assert!(matches!(outcome, UpdateOutcome::NothingToDo));
        assert_eq!(prompt.asked.get(), 0);
        assert!(installer.reporter().lines().contains(
            &"warning: A newer alpha release (v0.0.12-alpha) is available. Set CALC_ALLOW_ALPHA=1 to receive it."
                .to_string()
        ));
    }

    #[tokio::test]
    async fn test_declined_update_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("calc");
        std::fs::write(&exe, b"old").unwrap();

        let installer = installer();
        let prompt = Scripted::new(false);
        let ctx = context("v1.0.0", &exe);
        let outcome = run_update(&source(&["v2.0.0"]), &installer, &prompt, &ctx).await;

        assert!(matches!(outcome, UpdateOutcome::Declined));
        assert_eq!(prompt.asked.get(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert!(installer
            .reporter()
            .lines()
            .contains(&"info: Update cancelled.".to_string()));
    }

    #[tokio::test]
    async fn test_dry_run_never_prompts() {
        let installer = installer();
        let prompt = Scripted::new(true);
        let mut ctx = context("v1.0.0", Path::new("/nonexistent/calc"));
        ctx.dry_run = true;

        let outcome = run_update(&source(&["v2.0.0"]), &installer, &prompt, &ctx).await;
        assert!(matches!(outcome, UpdateOutcome::NothingToDo));
        assert_eq!(prompt.asked.get(), 0);
    }

    #[tokio::test]
    async fn test_install_failure_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("calc");
        std::fs::write(&exe, b"old").unwrap();

        let installer = installer();
        // Only a darwin build is published.
        let source = StaticSource(vec![
            Release::new("v2.0.0").with_url("darwin", "http://127.0.0.1:9/calc-darwin"),
        ]);
        let outcome = run_update(&source, &installer, &AssumeYes, &context("v1.0.0", &exe)).await;

        assert!(matches!(
            outcome,
            UpdateOutcome::InstallFailed(AcquisitionError::PlatformUnsupported(_))
        ));
        assert_eq!(std::fs::read(&exe).unwrap(), b"old");
        let lines = installer.reporter().lines();
        assert!(lines.contains(&"info: The current installation was left untouched.".to_string()));
    }

    #[tokio::test]
    async fn test_bad_catalog_is_a_warning() {
        let installer = installer();
        let outcome = run_update(
            &StaticSource::default(),
            &installer,
            &AssumeYes,
            &context("v1.0.0", Path::new("/nonexistent/calc")),
        )
        .await;

        assert!(matches!(outcome, UpdateOutcome::NothingToDo));
        assert!(installer
            .reporter()
            .lines()
            .iter()
            .any(|l| l.starts_with("warning: Update check failed")));
    }
}
