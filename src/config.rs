//! Route layout configuration for the guard.
//!
//! DESIGN
//! ======
//! Every path the guard reasons about lives here so that the decision logic
//! never hard-codes routes. Defaults match the dashboard's route table; a JSON
//! override document can replace any subset of fields.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::error::ConfigError;

/// Storage key holding the last protected path the visitor tried to reach.
pub const RETURN_PATH_KEY: &str = "pf:lastDashboardPath";

const DEFAULT_SIGN_IN_PATH: &str = "/login";
const DEFAULT_SIGN_UP_PATH: &str = "/signup";
const DEFAULT_ROOT_PATH: &str = "/";
const DEFAULT_LANDING_PATH: &str = "/dashboard";

/// Paths and keys used by [`RouteGuard`](crate::route_guard::RouteGuard).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    /// Where unauthenticated visitors are sent.
    pub sign_in_path: String,
    /// Account creation route; treated as an entry path like sign-in.
    pub sign_up_path: String,
    /// Site root; authenticated visitors are forwarded from here.
    pub root_path: String,
    /// Fallback destination when no usable return path is stored.
    pub default_landing_path: String,
    /// Path prefixes that require a signed-in user.
    pub protected_prefixes: Vec<String>,
    /// Durable storage key for the persisted return path.
    pub return_path_key: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_owned(),
            sign_up_path: DEFAULT_SIGN_UP_PATH.to_owned(),
            root_path: DEFAULT_ROOT_PATH.to_owned(),
            default_landing_path: DEFAULT_LANDING_PATH.to_owned(),
            protected_prefixes: vec![DEFAULT_LANDING_PATH.to_owned()],
            return_path_key: RETURN_PATH_KEY.to_owned(),
        }
    }
}

impl GuardConfig {
    /// Parse a JSON override document; omitted fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed, names an unknown
    /// field, or produces an invalid configuration.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every configured route is an absolute in-app path and that
    /// no entry path lies inside a protected prefix.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("sign_in_path", &self.sign_in_path),
            ("sign_up_path", &self.sign_up_path),
            ("root_path", &self.root_path),
            ("default_landing_path", &self.default_landing_path),
        ];
        for (field, value) in fields {
            if !is_absolute(value) {
                return Err(ConfigError::RelativePath { field, value: value.clone() });
            }
        }
        for prefix in &self.protected_prefixes {
            if !is_absolute(prefix) {
                return Err(ConfigError::RelativePath { field: "protected_prefixes", value: prefix.clone() });
            }
        }
        // Entry paths must stay reachable while signed out.
        let entries = [
            ("sign_in_path", &self.sign_in_path),
            ("sign_up_path", &self.sign_up_path),
            ("root_path", &self.root_path),
        ];
        for (field, value) in entries {
            if self.is_protected_path(value) {
                return Err(ConfigError::ProtectedEntryPath { field, value: value.clone() });
            }
        }
        if self.return_path_key.trim().is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(())
    }

    /// Whether `path` (without query string) lies inside a protected area.
    ///
    /// A prefix matches itself and anything below it on a segment boundary, so
    /// `/dashboard` protects `/dashboard/jobs` but not `/dashboards`.
    pub fn is_protected_path(&self, path: &str) -> bool {
        let path = strip_query(path);
        self.protected_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            if prefix.is_empty() {
                return true;
            }
            path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Whether `path` is one of the public entry routes (root, sign-in, sign-up).
    pub fn is_entry_path(&self, path: &str) -> bool {
        let path = strip_query(path);
        path == self.root_path || path == self.sign_in_path || path == self.sign_up_path
    }
}

fn strip_query(path: &str) -> &str {
    path.split_once(['?', '#']).map_or(path, |(head, _)| head)
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//")
}
