//! Process-wide view of the identity provider's current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The observer turns the provider's callback stream into one readable
//! [`AuthState`] with an explicit loading phase. The route guard and
//! identity-scoped queries read it; only the observer writes it.
//!
//! ERROR HANDLING
//! ==============
//! A provider that refuses registration resolves the state to signed out. The
//! UI always gets a definite state and never sees the error.

#[cfg(test)]
#[path = "auth_observer_test.rs"]
mod auth_observer_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::net::capability::{IdentityProvider, Unsubscribe};
use crate::state::auth::AuthState;

type Watcher = Rc<dyn Fn(&AuthState)>;

/// Handle returned by [`AuthObserver::watch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchId(u64);

#[derive(Default)]
struct Shared {
    state: AuthState,
    watchers: Vec<(WatchId, Watcher)>,
    next_watch: u64,
}

/// Owns the single provider listener for one mount.
pub struct AuthObserver {
    shared: Rc<RefCell<Shared>>,
    alive: Rc<Cell<bool>>,
    registration: Option<Unsubscribe>,
}

impl AuthObserver {
    /// Register exactly one listener with `provider`.
    pub fn mount(provider: &dyn IdentityProvider) -> Self {
        let shared = Rc::new(RefCell::new(Shared::default()));
        let alive = Rc::new(Cell::new(true));

        let weak: Weak<RefCell<Shared>> = Rc::downgrade(&shared);
        let listener_alive = alive.clone();
        let registration = provider.observe_current_user(Box::new(move |user| {
            if !listener_alive.get() {
                return;
            }
            if let Some(shared) = weak.upgrade() {
                apply(&shared, AuthState::resolved(user));
            }
        }));

        let registration = match registration {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("auth listener registration failed, treating visitor as signed out: {e}");
                apply(&shared, AuthState::resolved(None));
                None
            }
        };

        Self { shared, alive, registration }
    }

    /// Current auth state.
    pub fn state(&self) -> AuthState {
        self.shared.borrow().state.clone()
    }

    /// Call `f` after every state change until [`AuthObserver::unwatch`].
    pub fn watch(&self, f: impl Fn(&AuthState) + 'static) -> WatchId {
        let mut shared = self.shared.borrow_mut();
        let id = WatchId(shared.next_watch);
        shared.next_watch += 1;
        shared.watchers.push((id, Rc::new(f)));
        id
    }

    pub fn unwatch(&self, id: WatchId) {
        self.shared.borrow_mut().watchers.retain(|(entry, _)| *entry != id);
    }

    /// Whether a provider listener is currently held.
    ///
    /// False after [`AuthObserver::unmount`] and when registration failed.
    pub fn is_mounted(&self) -> bool {
        self.alive.get() && self.registration.is_some()
    }

    /// Deregister the provider listener; later deliveries are dropped.
    pub fn unmount(&mut self) {
        if !self.alive.replace(false) {
            return;
        }
        if let Some(handle) = self.registration.take() {
            handle.unsubscribe();
        }
        self.shared.borrow_mut().watchers.clear();
    }
}

impl Drop for AuthObserver {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn apply(shared: &Rc<RefCell<Shared>>, next: AuthState) {
    let watchers: Vec<Watcher> = {
        let mut shared = shared.borrow_mut();
        if shared.state == next {
            return;
        }
        shared.state = next.clone();
        shared.watchers.iter().map(|(_, w)| w.clone()).collect()
    };
    log::debug!("auth state resolved: user={:?}", next.user_id());
    for watcher in watchers {
        watcher(&next);
    }
}
