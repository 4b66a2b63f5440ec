//! Distribution channels and the permissions that unlock them.

use crate::version::{Prerelease, SemanticVersion};

/// Release-stability tier an installation belongs to.
///
/// An installation stays on the channel of the version it is running; the
/// resolver never offers a release from another channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Builds without a pre-release suffix.
    #[default]
    Stable,
    /// `-beta` builds.
    Beta,
    /// `-alpha` builds.
    Alpha,
}

impl Channel {
    /// Classify a version by its pre-release tag alone.
    ///
    /// # Example
    ///
    /// ```
    /// use calc_schema::{Channel, SemanticVersion};
    ///
    /// let v: SemanticVersion = "v1.4.0-beta".parse().unwrap();
    /// assert_eq!(Channel::of(&v), Channel::Beta);
    /// ```
    pub fn of(version: &SemanticVersion) -> Self {
        match version.prerelease() {
            Prerelease::None => Self::Stable,
            Prerelease::Beta => Self::Beta,
            Prerelease::Alpha => Self::Alpha,
        }
    }

    /// Permission a user must grant before updates on this channel are delivered.
    ///
    /// Stable needs none.
    pub fn required_permission(self) -> Option<Permission> {
        match self {
            Self::Stable => None,
            Self::Beta => Some(Permission::AllowBeta),
            Self::Alpha => Some(Permission::AllowAlpha),
        }
    }

    /// Lower-case channel name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An opt-in flag for pre-release channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Deliver updates to alpha installations.
    AllowAlpha,
    /// Deliver updates to beta installations.
    AllowBeta,
}

impl Permission {
    /// Environment variable that grants this permission.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::AllowAlpha => "CALC_ALLOW_ALPHA",
            Self::AllowBeta => "CALC_ALLOW_BETA",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_var())
    }
}
