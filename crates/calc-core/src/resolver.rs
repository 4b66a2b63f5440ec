//! Update eligibility.
//!
//! Picks the single best update target for the running version under
//! channel isolation: an installation only ever sees releases from its own
//! channel, whatever permissions are granted. Permissions decide whether the
//! chosen target is delivered or merely announced (gated).

use calc_schema::{Channel, Permission, Release, SemanticVersion};

use crate::permissions::PermissionSet;

/// Outcome of one eligibility check. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateDecision {
    /// Channel of the running version; `None` if it could not be parsed.
    pub current_channel: Option<Channel>,
    /// Permission the current channel needs (`None` for stable).
    pub required_permission: Option<Permission>,
    /// Newest same-channel release strictly newer than the running version.
    pub target: Option<Release>,
    /// True when `target` exists but the channel permission is not granted.
    pub gated: bool,
}

impl UpdateDecision {
    /// A newer same-channel release exists, gated or not.
    pub fn has_update(&self) -> bool {
        self.target.is_some()
    }

    /// The target, if it may be installed right now.
    pub fn deliverable(&self) -> Option<&Release> {
        self.target.as_ref().filter(|_| !self.gated)
    }
}

/// Decide whether `releases` holds an update for `current_version`.
///
/// An unparsable running version yields "no update" rather than an error, and
/// malformed catalog entries are skipped one by one. The catalog is scanned in
/// full; its order is irrelevant. Among equal versions the first entry wins.
pub fn resolve(
    current_version: &str,
    releases: &[Release],
    permissions: &PermissionSet,
) -> UpdateDecision {
    let current = match SemanticVersion::parse(current_version) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Cannot parse running version, skipping update check: {e}");
            return UpdateDecision::default();
        }
    };

    let current_channel = Channel::of(&current);
    let required_permission = current_channel.required_permission();

    let mut best: Option<(&Release, SemanticVersion)> = None;
    for release in releases {
        let (version, channel) = match release.classify() {
            Ok(classified) => classified,
            Err(e) => {
                tracing::warn!("Skipping manifest entry: {e}");
                continue;
            }
        };

        if channel != current_channel || !version.is_newer_than(&current) {
            continue;
        }

        if best
            .as_ref()
            .is_none_or(|(_, top)| version.is_newer_than(top))
        {
            best = Some((release, version));
        }
    }

    let target = best.map(|(release, _)| release.clone());
    let gated = target.is_some()
        && required_permission.is_some_and(|permission| !permissions.grants(permission));

    tracing::debug!(
        current = %current,
        channel = %current_channel,
        target = target.as_ref().map(|r| r.version.as_str()),
        gated,
        "resolved update"
    );

    UpdateDecision {
        current_channel: Some(current_channel),
        required_permission,
        target,
        gated,
    }
}
