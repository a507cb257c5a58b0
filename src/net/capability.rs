//! Capabilities consumed from the host environment.
//!
//! SYSTEM CONTEXT
//! ==============
//! The identity provider, document backend, durable storage and router are
//! external services. Engines in this crate only see them through these traits,
//! which lets tests drive every engine with scripted fakes.
//!
//! CANCELLATION
//! ============
//! Every registration hands back an [`Unsubscribe`]. Engines clear their own
//! liveness flag before invoking it, so a delivery that races with teardown is
//! dropped even if the provider fires it late.

#[cfg(test)]
#[path = "capability_test.rs"]
mod capability_test;

use std::fmt;

use crate::error::{AuthResolutionError, StorageError, SubscriptionError};
use crate::net::types::{QueryDescription, UserIdentity};

/// Receives the current user (or `None` when signed out) once per change.
pub type AuthCallback = Box<dyn Fn(Option<UserIdentity>)>;

/// Receives the full current result set of a query.
pub type SnapshotCallback<T> = Box<dyn Fn(Vec<T>)>;

/// Receives a terminal query failure.
pub type ErrorCallback = Box<dyn Fn(SubscriptionError)>;

/// One-shot teardown handle for a listener or subscription.
///
/// The teardown runs at most once: on [`Unsubscribe::unsubscribe`], or on drop
/// if it was never called explicitly.
pub struct Unsubscribe {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Unsubscribe {
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self { teardown: Some(Box::new(teardown)) }
    }

    /// Handle with nothing to tear down.
    pub fn noop() -> Self {
        Self { teardown: None }
    }

    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Unsubscribe {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe").field("pending", &self.teardown.is_some()).finish()
    }
}

/// External authentication service.
pub trait IdentityProvider {
    /// Register `callback` for current-user changes.
    ///
    /// The callback must eventually fire at least once, even for a signed-out
    /// visitor; the first call may happen synchronously inside this method.
    ///
    /// # Errors
    ///
    /// Returns [`AuthResolutionError`] if the listener cannot be registered.
    fn observe_current_user(&self, callback: AuthCallback) -> Result<Unsubscribe, AuthResolutionError>;
}

/// External document database with live queries.
pub trait CollectionBackend<T> {
    /// Open a live subscription for `query`.
    ///
    /// Each `on_snapshot` call carries the complete current result set. After
    /// `on_error` fires the backend sends nothing further for this subscription.
    fn subscribe(&self, query: &QueryDescription, on_snapshot: SnapshotCallback<T>, on_error: ErrorCallback)
    -> Unsubscribe;
}

/// Key/value storage that survives reloads (browser `localStorage`).
pub trait DurableStorage {
    /// # Errors
    ///
    /// Returns [`StorageError`] if storage is unavailable or the read fails.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] if storage is unavailable or the write fails.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Client-side router.
pub trait Navigator {
    /// Current path including any query string.
    fn current_path(&self) -> String;
    /// Navigate without appending a history entry.
    fn replace(&self, path: &str);
    /// Navigate and append a history entry.
    fn push(&self, path: &str);
}
