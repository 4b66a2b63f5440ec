//! Build script to derive version from git tags and stamp the build time
//!
//! The binary reports this version, and the self-updater compares it against
//! the release manifest, so it must match the published tag.

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=CALC_VERSION");
    println!("cargo:rerun-if-env-changed=CALC_BUILD_TIME");

    // Release builds pin the version explicitly (e.g. CALC_VERSION=v0.0.12-alpha).
    let version = std::env::var("CALC_VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(git_describe)
        .map(|s| s.trim().trim_start_matches('v').to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=CALC_VERSION={version}");

    // Reproducible builds may pin the timestamp.
    let build_time = std::env::var("CALC_BUILD_TIME")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string());

    println!("cargo:rustc-env=CALC_BUILD_TIME={build_time}");
}

fn git_describe() -> Option<String> {
    std::process::Command::new("git")
        .args(["describe", "--tags", "--abbrev=0"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
}
