//! Version parsing and ordering for published releases.
//!
//! Accepted shape: an optional `v`/`V` prefix, exactly three dot-separated
//! numeric components, and an optional `-alpha` or `-beta` suffix
//! (case-insensitive):
//!
//! - `1.2.3`, `v1.2.3`
//! - `v0.0.10-alpha`, `2.1.0-BETA`
//!
//! Anything else is rejected as a whole; a [`SemanticVersion`] is never
//! partially filled.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced while parsing a version string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The text does not match `[v]MAJOR.MINOR.PATCH[-alpha|-beta]`.
    #[error("Invalid version format: '{0}'")]
    InvalidFormat(String),
}

/// Pre-release tag attached to a version.
///
/// Variant order is the ranking at an equal numeric triple:
/// `Alpha < Beta < None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Prerelease {
    /// `-alpha` suffix.
    Alpha,
    /// `-beta` suffix.
    Beta,
    /// No suffix (a stable build).
    #[default]
    None,
}

impl Prerelease {
    /// Suffix as written after the patch component, without the dash.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Alpha => Some("alpha"),
            Self::Beta => Some("beta"),
            Self::None => None,
        }
    }

    fn from_suffix(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("alpha") {
            Some(Self::Alpha)
        } else if tag.eq_ignore_ascii_case("beta") {
            Some(Self::Beta)
        } else {
            None
        }
    }
}

/// A parsed `major.minor.patch[-prerelease]` version.
///
/// Field order matters: the derived [`Ord`] compares the numeric triple first
/// and only falls back to the [`Prerelease`] rank when it is equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Prerelease,
}

impl SemanticVersion {
    /// Parse a version string.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidFormat`] for missing or extra
    /// components, non-numeric components, or an unknown suffix.
    ///
    /// # Example
    ///
    /// ```
    /// use calc_schema::{Prerelease, SemanticVersion};
    ///
    /// let v = SemanticVersion::parse("v0.0.12-alpha").unwrap();
    /// assert_eq!(v.patch(), 12);
    /// assert_eq!(v.prerelease(), Prerelease::Alpha);
    /// assert!(SemanticVersion::parse("1.2").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat(text.to_string());

        let body = text.strip_prefix(['v', 'V']).unwrap_or(text);
        let (core, prerelease) = match body.split_once('-') {
            Some((core, tag)) => (core, Prerelease::from_suffix(tag).ok_or_else(invalid)?),
            None => (body, Prerelease::None),
        };

        let mut parts = core.split('.');
        let major = parse_component(parts.next()).ok_or_else(invalid)?;
        let minor = parse_component(parts.next()).ok_or_else(invalid)?;
        let patch = parse_component(parts.next()).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.major
    }

    /// Minor component.
    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Patch component.
    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Pre-release tag.
    pub fn prerelease(&self) -> Prerelease {
        self.prerelease
    }

    /// Returns true if `self` sorts strictly after `other`.
    pub fn is_newer_than(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Greater
    }
}

/// Digits only: `u64::from_str` would also accept a leading `+`.
fn parse_component(part: Option<&str>) -> Option<u64> {
    let part = part?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(tag) = self.prerelease.as_str() {
            write!(f, "-{tag}")?;
        }
        Ok(())
    }
}
