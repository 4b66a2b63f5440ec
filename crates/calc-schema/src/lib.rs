//! Shared types for the calc self-updater: version ordering, channels, and the
//! release catalog wire format.

pub mod channel;
pub mod platform;
pub mod release;
pub mod version;

// Re-exports
pub use channel::{Channel, Permission};
pub use release::{Manifest, Release};
pub use version::{Prerelease, SemanticVersion, VersionError};
