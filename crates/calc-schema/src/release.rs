//! Release catalog wire format (`version.json`).
//!
//! ```json
//! {
//!   "releases": [
//!     {
//!       "version": "v1.2.0",
//!       "urls": { "linux": "https://…/calc-linux", "darwin": "https://…/calc-darwin" },
//!       "isAlpha": false,
//!       "isBeta": false,
//!       "releaseDate": "2025-06-01T12:00:00Z"
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::version::{SemanticVersion, VersionError};

/// A single published build.
///
/// Holds the version text exactly as published; the parsed form is derived on
/// demand so that one malformed entry can be skipped without rejecting the
/// whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Version text, e.g. `v0.0.12-alpha`.
    pub version: String,

    /// Platform key (`linux`, `darwin`, `windows`) to absolute download URL.
    #[serde(default)]
    pub urls: BTreeMap<String, String>,

    /// Explicit alpha flag. Authoritative over the version suffix when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_alpha: Option<bool>,

    /// Explicit beta flag. Authoritative over the version suffix when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_beta: Option<bool>,

    /// Publication timestamp, ISO-8601.
    #[serde(default)]
    pub release_date: String,
}

impl Release {
    /// Create a release with no download URLs and no channel flags.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            urls: BTreeMap::new(),
            is_alpha: None,
            is_beta: None,
            release_date: String::new(),
        }
    }

    /// Add a download URL for a platform key.
    pub fn with_url(mut self, platform: impl Into<String>, url: impl Into<String>) -> Self {
        self.urls.insert(platform.into(), url.into());
        self
    }

    /// Set both channel flags explicitly.
    pub fn with_flags(mut self, is_alpha: bool, is_beta: bool) -> Self {
        self.is_alpha = Some(is_alpha);
        self.is_beta = Some(is_beta);
        self
    }

    /// Set the publication timestamp.
    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = date.into();
        self
    }

    /// Parse the published version text.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidFormat`] if the text is malformed.
    pub fn semantic_version(&self) -> Result<SemanticVersion, VersionError> {
        SemanticVersion::parse(&self.version)
    }

    /// Channel declared by the `isAlpha` / `isBeta` flags, if the publisher set any.
    ///
    /// `isAlpha` wins when both are true.
    pub fn declared_channel(&self) -> Option<Channel> {
        match (self.is_alpha, self.is_beta) {
            (None, None) => None,
            (Some(true), _) => Some(Channel::Alpha),
            (_, Some(true)) => Some(Channel::Beta),
            _ => Some(Channel::Stable),
        }
    }

    /// Parse the version and decide the channel in one step.
    ///
    /// Flags win over the suffix; a disagreement is logged.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidFormat`] if the version text is malformed.
    pub fn classify(&self) -> Result<(SemanticVersion, Channel), VersionError> {
        let version = self.semantic_version()?;
        let from_suffix = Channel::of(&version);

        let channel = match self.declared_channel() {
            Some(declared) if declared != from_suffix => {
                tracing::warn!(
                    version = %self.version,
                    declared = %declared,
                    suffix = %from_suffix,
                    "release flags disagree with version suffix, using flags"
                );
                declared
            }
            Some(declared) => declared,
            None => from_suffix,
        };

        Ok((version, channel))
    }

    /// Channel of this release, see [`classify`](Self::classify).
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidFormat`] if the version text is malformed.
    pub fn channel(&self) -> Result<Channel, VersionError> {
        self.classify().map(|(_, channel)| channel)
    }

    /// Download URL for a platform key.
    pub fn download_url(&self, platform: &str) -> Option<&str> {
        self.urls.get(platform).map(String::as_str)
    }

    /// Publication time, if `releaseDate` is RFC 3339 or a plain `YYYY-MM-DD`.
    pub fn released_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.release_date.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

/// The published release catalog. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    /// Published builds.
    pub releases: Vec<Release>,
}

impl Manifest {
    /// Decode a `version.json` document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or mistyped fields.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// True when no releases are listed.
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}
