//! Persisted "last protected path" used to resume after reload or sign-in.
//!
//! ERROR HANDLING
//! ==============
//! Storage is best-effort. A failed read is treated as "nothing stored" and a
//! failed write is logged and forgotten; neither ever blocks navigation.

#[cfg(test)]
#[path = "return_path_test.rs"]
mod return_path_test;

use std::rc::Rc;

use crate::config::GuardConfig;
use crate::net::capability::DurableStorage;

/// Single last-write-wins slot in durable storage.
#[derive(Clone)]
pub struct ReturnPathStore {
    storage: Rc<dyn DurableStorage>,
    key: String,
}

impl ReturnPathStore {
    pub fn new(storage: Rc<dyn DurableStorage>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record `path` (including query string) as the last protected location.
    pub fn record(&self, path: &str) {
        if let Err(e) = self.storage.set_item(&self.key, path) {
            log::warn!("could not persist return path {path}: {e}");
        }
    }

    /// Stored path, if any and if it is still a protected in-app path.
    ///
    /// Values that would leave the app (`//host`, `https://...`) or land on a
    /// public page are ignored so a stale or tampered entry cannot cause an
    /// open redirect or a redirect loop.
    pub fn load(&self, config: &GuardConfig) -> Option<String> {
        let stored = match self.storage.get_item(&self.key) {
            Ok(stored) => stored?,
            Err(e) => {
                log::warn!("could not read return path, using default landing: {e}");
                return None;
            }
        };
        if is_resumable(&stored, config) {
            Some(stored)
        } else {
            log::debug!("ignoring stored return path {stored:?}");
            None
        }
    }
}

/// Only the path part is checked for host-changing forms; the query string may
/// carry any characters.
fn is_resumable(path: &str, config: &GuardConfig) -> bool {
    let path_part = path.split(['?', '#']).next().unwrap_or_default();
    path_part.starts_with('/')
        && !path_part.starts_with("//")
        && !path_part.contains('\\')
        && config.is_protected_path(path)
}
