//! Redirect decisions for protected routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! One guard is instantiated near the application root and re-evaluated on
//! every change to the auth state or the location. It sends signed-out
//! visitors to sign-in, forwards signed-in visitors away from entry pages to
//! where they last were, and records every protected location it sees.
//!
//! ORDERING
//! ========
//! Each evaluation runs in three phases: decide (storage reads), record the
//! return path (storage writes), navigate. Reads therefore never observe a
//! write from the same pass, and a protected path is recorded even when the
//! same pass redirects a signed-out visitor away from it, so they come back to
//! it after signing in.

#[cfg(test)]
#[path = "route_guard_test.rs"]
mod route_guard_test;

use std::rc::Rc;

use crate::config::GuardConfig;
use crate::net::capability::{DurableStorage, Navigator};
use crate::return_path::ReturnPathStore;
use crate::state::auth::AuthState;
use crate::state::navigation::NavigationIntent;

/// Outcome of one [`RouteGuard::evaluate`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Inputs equal the previous evaluation; nothing was done.
    Unchanged,
    /// Auth is still loading; decisions are suspended.
    Hold,
    /// Visitor may stay where they are.
    Allow,
    /// Signed-out visitor on a protected path was replaced to sign-in.
    RedirectToSignIn(String),
    /// Signed-in visitor on an entry path was replaced to the stored path.
    RestoreReturnPath(String),
    /// Signed-in visitor on an entry path with nothing usable stored.
    RedirectToLanding(String),
}

impl GuardDecision {
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::RedirectToSignIn(path) | Self::RestoreReturnPath(path) | Self::RedirectToLanding(path) => {
                Some(path.as_str())
            }
            Self::Unchanged | Self::Hold | Self::Allow => None,
        }
    }
}

pub struct RouteGuard {
    config: GuardConfig,
    return_path: ReturnPathStore,
    navigator: Rc<dyn Navigator>,
    last_auth: Option<AuthState>,
    last_intent: Option<NavigationIntent>,
}

impl RouteGuard {
    pub fn new(config: GuardConfig, storage: Rc<dyn DurableStorage>, navigator: Rc<dyn Navigator>) -> Self {
        let return_path = ReturnPathStore::new(storage, config.return_path_key.clone());
        Self { config, return_path, navigator, last_auth: None, last_intent: None }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Evaluate against the navigator's current location.
    pub fn evaluate_current(&mut self, auth: &AuthState) -> GuardDecision {
        let intent = NavigationIntent::from_location(&self.navigator.current_path(), &self.config);
        self.evaluate(auth, &intent)
    }

    /// Re-run the guard for the latest inputs.
    ///
    /// Calling this again with equal inputs is a no-op, so a redirect fires at
    /// most once per resolved state.
    pub fn evaluate(&mut self, auth: &AuthState, intent: &NavigationIntent) -> GuardDecision {
        let auth_changed = self.last_auth.as_ref() != Some(auth);
        let intent_changed = self.last_intent.as_ref() != Some(intent);
        if !auth_changed && !intent_changed {
            return GuardDecision::Unchanged;
        }
        self.last_auth = Some(auth.clone());
        self.last_intent = Some(intent.clone());

        let decision = self.decide(auth, intent);

        if intent_changed && intent.is_protected_area {
            self.return_path.record(&intent.full_path());
        }

        if let Some(target) = decision.redirect_target() {
            log::debug!("route guard: {} -> {target}", intent.full_path());
            self.navigator.replace(target);
        }
        decision
    }

    fn decide(&self, auth: &AuthState, intent: &NavigationIntent) -> GuardDecision {
        if auth.loading {
            return GuardDecision::Hold;
        }

        // A missing user always beats a stored return path.
        if auth.user.is_none() {
            if intent.is_protected_area {
                return unless_already_there(intent, GuardDecision::RedirectToSignIn(self.config.sign_in_path.clone()));
            }
            return GuardDecision::Allow;
        }

        if !self.config.is_entry_path(&intent.current_path) {
            return GuardDecision::Allow;
        }

        let decision = match self.return_path.load(&self.config) {
            Some(path) => GuardDecision::RestoreReturnPath(path),
            None => GuardDecision::RedirectToLanding(self.config.default_landing_path.clone()),
        };
        unless_already_there(intent, decision)
    }
}

/// Never redirect onto the location the visitor is already at.
fn unless_already_there(intent: &NavigationIntent, decision: GuardDecision) -> GuardDecision {
    let already_there = decision.redirect_target().is_some_and(|target| target == intent.full_path());
    if already_there { GuardDecision::Allow } else { decision }
}
