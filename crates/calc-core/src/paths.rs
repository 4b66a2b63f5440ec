//! Filesystem locations used while replacing the running executable.

use std::path::{Path, PathBuf};

/// Resolved path of the running executable, symlinks followed so the real
/// file is the one replaced.
///
/// # Errors
///
/// Returns an error if the platform cannot report the executable path.
pub fn current_exe() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.canonicalize().unwrap_or(exe))
}

/// Backup location for `exe` before replacing version `version`:
/// `<exe>.<version>.bak`, beside the executable.
pub fn backup_path(exe: &Path, version: &str) -> PathBuf {
    let version: String = version
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let mut name = exe.as_os_str().to_owned();
    name.push(format!(".{version}.bak"));
    PathBuf::from(name)
}

/// Directory staged downloads are written to (same volume as `exe`).
pub fn staging_dir(exe: &Path) -> &Path {
    match exe.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
