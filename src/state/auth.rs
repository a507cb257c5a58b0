//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard and identity-scoped queries to coordinate login
//! redirects and per-user data.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::types::UserIdentity;

/// Authentication state tracking the current user and loading status.
///
/// `loading` is `true` only until the identity provider's first answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserIdentity>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::pending()
    }
}

impl AuthState {
    /// Before the provider has answered.
    pub fn pending() -> Self {
        Self { user: None, loading: true }
    }

    /// After the provider has answered with `user`.
    pub fn resolved(user: Option<UserIdentity>) -> Self {
        Self { user, loading: false }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.loading && self.user.is_some()
    }

    /// Resolved with no user present.
    pub fn is_signed_out(&self) -> bool {
        !self.loading && self.user.is_none()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}
