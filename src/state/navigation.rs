//! Where the visitor currently is, as seen by the route guard.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use crate::config::GuardConfig;
use crate::util::router::join_location;

/// Snapshot of the active location, recomputed on every navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationIntent {
    /// Path without query string or fragment.
    pub current_path: String,
    /// Query string without the leading `?`; empty when absent.
    pub query_string: String,
    pub is_protected_area: bool,
}

impl NavigationIntent {
    /// Derive an intent from a location such as `/dashboard/jobs?status=open#top`.
    ///
    /// The fragment is dropped; an empty path is read as the site root.
    pub fn from_location(location: &str, config: &GuardConfig) -> Self {
        let without_fragment = location.split_once('#').map_or(location, |(head, _)| head);
        let (path, query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
        let current_path = if path.is_empty() { "/".to_owned() } else { path.to_owned() };
        let is_protected_area = config.is_protected_path(&current_path);
        Self { current_path, query_string: query.to_owned(), is_protected_area }
    }

    /// Build from router parts, where `search` may carry a leading `?`.
    pub fn from_parts(pathname: &str, search: &str, config: &GuardConfig) -> Self {
        Self::from_location(&join_location(pathname, search), config)
    }

    /// Path plus query string, suitable for navigation.
    pub fn full_path(&self) -> String {
        if self.query_string.is_empty() {
            self.current_path.clone()
        } else {
            format!("{}?{}", self.current_path, self.query_string)
        }
    }
}
