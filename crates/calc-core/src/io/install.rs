//! Replace the running executable with a downloaded release.
//!
//! Stages run strictly in order and stop at the first failure:
//!
//! 1. resolve the download URL for the platform
//! 2. back up the current executable (`<exe>.<version>.bak`)
//! 3. stream the binary into a temp file beside the executable
//! 4. reject payloads under [`MIN_BINARY_SIZE`]
//! 5. check the declared content type (warning only)
//! 6. require an ELF, Mach-O or PE signature
//! 7. mark the temp file executable
//! 8. run it with `--version` and require exit status 0
//! 9. rename it onto the executable
//!
//! The temp file is a [`TempPath`], so every early return removes it. The
//! executable itself is only touched by the final rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use calc_schema::{Channel, Release};
use reqwest::Client;
use tempfile::TempPath;
use thiserror::Error;
use wait_timeout::ChildExt;

use super::download::{DownloadError, download_to};
use super::validate::{ContentType, ExecutableFormat, MIN_BINARY_SIZE};
use crate::{Reporter, paths};

/// Bound on the binary download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Bound on the `--version` smoke test.
pub const SMOKE_TEST_TIMEOUT: Duration = Duration::from_secs(10);

const SPAWN_ATTEMPTS: u32 = 5;

/// Why an install was aborted. The current executable is untouched in every case.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The release has no download URL for this platform.
    #[error("No binary published for platform '{0}'")]
    PlatformUnsupported(String),

    #[error("Failed to back up current executable to {path}: {source}")]
    /// Copying the current executable aside failed.
    Backup {
        /// Intended backup location.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The binary could not be downloaded.
    #[error("Download failed: {0}")]
    Fetch(#[from] DownloadError),

    /// Staging file error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer than [`MIN_BINARY_SIZE`] bytes arrived.
    #[error("Downloaded file is too small ({0} bytes), likely an error page")]
    FileTooSmall(u64),

    /// No ELF, Mach-O or PE signature.
    #[error("Downloaded file is not a recognised executable")]
    NotAnExecutable,

    /// The new binary did not run, exited non-zero or timed out.
    #[error("Downloaded binary failed its self-test: {0}")]
    BinaryFailedSelfTest(String),

    #[error("Failed to install new binary at {path}: {source}")]
    /// The final rename onto the executable failed.
    InstallFailed {
        /// Executable that was to be replaced.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Tunables for [`Installer`].
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Bound on the whole download.
    pub download_timeout: Duration,
    /// Bound on the smoke test; the child is killed when exceeded.
    pub smoke_test_timeout: Duration,
    /// Argument the new binary is run with during the smoke test.
    pub version_arg: String,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            download_timeout: DOWNLOAD_TIMEOUT,
            smoke_test_timeout: SMOKE_TEST_TIMEOUT,
            version_arg: "--version".to_string(),
        }
    }
}

/// A completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Version text of the installed release.
    pub installed_version: String,
    /// Copy of the previous executable.
    pub backup_path: PathBuf,
    /// Size of the new binary.
    pub bytes_written: u64,
    /// Detected executable format.
    pub format: ExecutableFormat,
}

/// Runs the acquisition pipeline, reporting progress to `R`.
#[derive(Debug)]
pub struct Installer<R> {
    client: Client,
    options: InstallOptions,
    reporter: R,
}

impl<R: Reporter> Installer<R> {
    /// Installer with [`InstallOptions::default`].
    pub fn new(client: Client, reporter: R) -> Self {
        Self {
            client,
            options: InstallOptions::default(),
            reporter,
        }
    }

    /// Replace the default options.
    pub fn with_options(mut self, options: InstallOptions) -> Self {
        self.options = options;
        self
    }

    /// Reporter progress goes to.
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Replace `exe_path` with `release`'s binary for `platform`.
    ///
    /// On success the caller should exit; the new binary takes effect on the
    /// next launch.
    ///
    /// # Errors
    ///
    /// Returns the [`AcquisitionError`] of the first failing stage. In every
    /// error case the file at `exe_path` is unchanged and no temp file
    /// remains.
    pub async fn install(
        &self,
        release: &Release,
        platform: &str,
        exe_path: &Path,
        current_version: &str,
    ) -> Result<InstallReport, AcquisitionError> {
        let url = release
            .download_url(platform)
            .ok_or_else(|| AcquisitionError::PlatformUnsupported(platform.to_string()))?;

        let backup_path = paths::backup_path(exe_path, current_version);
        tokio::fs::copy(exe_path, &backup_path)
            .await
            .map_err(|source| AcquisitionError::Backup {
                path: backup_path.clone(),
                source,
            })?;
        tracing::debug!(backup = %backup_path.display(), "backed up current executable");
        self.reporter
            .info(&format!("Backed up current version to {}", backup_path.display()));

        let staged = tempfile::Builder::new()
            .prefix(".calc-update-")
            .suffix(".new")
            .tempfile_in(paths::staging_dir(exe_path))?;
        let (file, staged) = staged.into_parts();

        self.reporter.info(&format!(
            "Downloading {platform} binary{} from: {url}",
            channel_label(release)
        ));
        let mut file = tokio::fs::File::from_std(file);
        let download = download_to(
            &self.client,
            url,
            &mut file,
            self.options.download_timeout,
            &self.reporter,
        )
        .await?;
        file.sync_all().await?;
        // The handle must be closed before the file can be executed.
        drop(file.into_std().await);
        self.reporter
            .info(&format!("Downloaded {} bytes", download.bytes_written));

        if download.bytes_written < MIN_BINARY_SIZE {
            return Err(AcquisitionError::FileTooSmall(download.bytes_written));
        }

        self.check_content_type(download.content_type.as_deref());

        let format = ExecutableFormat::sniff(&staged)?.ok_or(AcquisitionError::NotAnExecutable)?;
        tracing::debug!(%format, "executable signature recognised");

        set_executable(&staged)?;

        self.smoke_test(&staged).await?;
        self.reporter.info("Binary validation test passed");

        staged
            .persist(exe_path)
            .map_err(|e| AcquisitionError::InstallFailed {
                path: exe_path.to_path_buf(),
                source: e.error,
            })?;
        tracing::debug!(exe = %exe_path.display(), version = %release.version, "installed");

        Ok(InstallReport {
            installed_version: release.version.clone(),
            backup_path,
            bytes_written: download.bytes_written,
            format,
        })
    }

    fn check_content_type(&self, content_type: Option<&str>) {
        let shown = content_type.unwrap_or("<none>");
        match ContentType::classify(content_type) {
            ContentType::Binary => tracing::debug!(content_type = shown, "binary content type"),
            ContentType::Plausible => {
                tracing::warn!(content_type = shown, "non-binary content type");
                self.reporter.warning(&format!(
                    "Content type is '{shown}', not a binary type. Continuing with signature check."
                ));
            }
            ContentType::Unexpected => {
                tracing::warn!(content_type = shown, "unexpected content type");
                self.reporter.warning(&format!(
                    "Unexpected content type '{shown}'. Continuing with signature check."
                ));
            }
        }
    }

    async fn smoke_test(&self, path: &TempPath) -> Result<(), AcquisitionError> {
        let path = path.to_path_buf();
        let arg = self.options.version_arg.clone();
        let timeout = self.options.smoke_test_timeout;

        tokio::task::spawn_blocking(move || run_self_test(&path, &arg, timeout))
            .await
            .map_err(|e| AcquisitionError::BinaryFailedSelfTest(e.to_string()))?
    }
}

fn channel_label(release: &Release) -> &'static str {
    match release.channel() {
        Ok(Channel::Alpha) => " (ALPHA RELEASE)",
        Ok(Channel::Beta) => " (BETA RELEASE)",
        _ => "",
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn run_self_test(path: &Path, arg: &str, timeout: Duration) -> Result<(), AcquisitionError> {
    let mut child = spawn_quiet(path, arg)
        .map_err(|e| AcquisitionError::BinaryFailedSelfTest(format!("could not execute: {e}")))?;

    match child.wait_timeout(timeout) {
        Ok(Some(status)) if status.success() => Ok(()),
        Ok(Some(status)) => Err(AcquisitionError::BinaryFailedSelfTest(format!(
            "`{arg}` exited with {status}"
        ))),
        Ok(None) => {
            abandon(&mut child);
            Err(AcquisitionError::BinaryFailedSelfTest(format!(
                "`{arg}` did not finish within {}s",
                timeout.as_secs()
            )))
        }
        Err(e) => {
            abandon(&mut child);
            Err(AcquisitionError::BinaryFailedSelfTest(e.to_string()))
        }
    }
}

/// Kill and reap a child that is no longer wanted.
fn abandon(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn is_text_busy(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::ExecutableFileBusy
}

/// Spawn with all stdio discarded. A freshly written file can briefly report
/// "text file busy" on Linux while the kernel releases the writer.
fn spawn_quiet(path: &Path, arg: &str) -> std::io::Result<Child> {
    let mut attempt = 1;
    loop {
        let spawned = Command::new(path)
            .arg(arg)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Err(e) if is_text_busy(&e) && attempt < SPAWN_ATTEMPTS => {
                attempt += 1;
                std::thread::sleep(Duration::from_millis(50));
            }
            other => return other,
        }
    }
}
