//! Platform keys used in the manifest's `urls` object.
//!
//! The publisher keys binaries by operating system using Go-style names, so
//! macOS is `darwin` rather than Rust's `macos`.
//!
//! # Example
//!
//! ```
//! use calc_schema::platform;
//!
//! assert_eq!(platform::key_for_os("macos"), "darwin");
//! assert_eq!(platform::key_for_os("linux"), "linux");
//! ```

/// Linux binaries.
pub const LINUX: &str = "linux";
/// macOS binaries.
pub const DARWIN: &str = "darwin";
/// Windows binaries.
pub const WINDOWS: &str = "windows";

/// Manifest key for the platform this binary was compiled for.
pub fn current() -> &'static str {
    key_for_os(std::env::consts::OS)
}

/// Map a Rust `target_os` name to the manifest key. Unknown names pass through.
pub fn key_for_os(os: &'static str) -> &'static str {
    match os {
        "macos" => DARWIN,
        "linux" => LINUX,
        "windows" => WINDOWS,
        other => other,
    }
}
