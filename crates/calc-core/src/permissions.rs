//! Pre-release opt-in flags.
//!
//! Read from the environment once at start-up and then passed explicitly into
//! the resolver, so the resolver itself never touches process state.

use calc_schema::Permission;

/// Which pre-release channels the user has opted into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionSet {
    /// `CALC_ALLOW_ALPHA` is set.
    pub allow_alpha: bool,
    /// `CALC_ALLOW_BETA` is set.
    pub allow_beta: bool,
}

impl PermissionSet {
    /// Explicit flags, mostly for tests.
    pub fn new(allow_alpha: bool, allow_beta: bool) -> Self {
        Self {
            allow_alpha,
            allow_beta,
        }
    }

    /// Read `CALC_ALLOW_ALPHA` and `CALC_ALLOW_BETA` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |permission: Permission| {
            lookup(permission.env_var()).is_some_and(|value| is_truthy(&value))
        };
        Self {
            allow_alpha: flag(Permission::AllowAlpha),
            allow_beta: flag(Permission::AllowBeta),
        }
    }

    /// Whether `permission` has been granted.
    pub fn grants(&self, permission: Permission) -> bool {
        match permission {
            Permission::AllowAlpha => self.allow_alpha,
            Permission::AllowBeta => self.allow_beta,
        }
    }
}

/// Any non-empty value except `0` and `false` (any case) enables a flag.
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}
