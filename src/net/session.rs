//! Cookie-session identity provider backed by the server's auth endpoints.
//!
//! Client-side (hydrate): `GET /api/auth/me` via `gloo-net`, re-fetched on
//! [`SessionIdentityProvider::refresh`]. Server-side (SSR): every listener is
//! told the visitor is signed out, keeping server rendering deterministic.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures and non-2xx responses resolve to `None` so the observer
//! always reaches a definite state.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::AuthResolutionError;
use crate::net::capability::{AuthCallback, IdentityProvider, Unsubscribe};
use crate::net::types::UserIdentity;

const DEFAULT_ME_ENDPOINT: &str = "/api/auth/me";
const DEFAULT_LOGOUT_ENDPOINT: &str = "/api/auth/logout";

type Listener = Rc<dyn Fn(Option<UserIdentity>)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Identity provider for same-origin cookie sessions.
///
/// Clones share one listener list, so a `sign_out` on any clone reaches every
/// registered observer.
#[derive(Clone)]
pub struct SessionIdentityProvider {
    me_endpoint: String,
    logout_endpoint: String,
    listeners: Rc<RefCell<Listeners>>,
}

impl Default for SessionIdentityProvider {
    fn default() -> Self {
        Self::new(DEFAULT_ME_ENDPOINT, DEFAULT_LOGOUT_ENDPOINT)
    }
}

impl SessionIdentityProvider {
    pub fn new(me_endpoint: impl Into<String>, logout_endpoint: impl Into<String>) -> Self {
        Self {
            me_endpoint: me_endpoint.into(),
            logout_endpoint: logout_endpoint.into(),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Re-resolve the session and broadcast the result to every listener.
    pub fn refresh(&self) {
        let listeners = self.listeners.clone();
        let alive = Rc::new(Cell::new(true));
        resolve(&self.me_endpoint, alive, move |user| broadcast(&listeners, user));
    }

    /// End the server session, then broadcast the signed-out state.
    pub fn sign_out(&self) {
        #[cfg(feature = "hydrate")]
        {
            let listeners = self.listeners.clone();
            let endpoint = self.logout_endpoint.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = gloo_net::http::Request::post(&endpoint).send().await {
                    log::warn!("logout request failed: {e}");
                }
                broadcast(&listeners, None);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &self.logout_endpoint;
            broadcast(&self.listeners, None);
        }
    }
}

impl IdentityProvider for SessionIdentityProvider {
    fn observe_current_user(&self, callback: AuthCallback) -> Result<Unsubscribe, AuthResolutionError> {
        let callback: Listener = Rc::from(callback);
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, callback.clone()));
            id
        };

        let alive = Rc::new(Cell::new(true));
        resolve(&self.me_endpoint, alive.clone(), move |user| callback(user));

        let listeners = Rc::downgrade(&self.listeners);
        Ok(Unsubscribe::new(move || {
            alive.set(false);
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        }))
    }
}

fn broadcast(listeners: &Rc<RefCell<Listeners>>, user: Option<UserIdentity>) {
    let snapshot: Vec<Listener> = listeners.borrow().entries.iter().map(|(_, l)| l.clone()).collect();
    for listener in snapshot {
        listener(user.clone());
    }
}

/// Fetch the current user and hand it to `deliver` unless `alive` was cleared.
fn resolve<F>(endpoint: &str, alive: Rc<Cell<bool>>, deliver: F)
where
    F: FnOnce(Option<UserIdentity>) + 'static,
{
    #[cfg(feature = "hydrate")]
    {
        let endpoint = endpoint.to_owned();
        wasm_bindgen_futures::spawn_local(async move {
            let user = fetch_current_user(&endpoint).await;
            if alive.get() {
                deliver(user);
            }
        });
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = endpoint;
        if alive.get() {
            deliver(None);
        }
    }
}

#[cfg(feature = "hydrate")]
async fn fetch_current_user(endpoint: &str) -> Option<UserIdentity> {
    let resp = match gloo_net::http::Request::get(endpoint).send().await {
        Ok(resp) => resp,
        Err(e) => {
            log::warn!("session lookup failed: {e}");
            return None;
        }
    };
    if !resp.ok() {
        log::debug!("session lookup returned {}", resp.status());
        return None;
    }
    resp.json::<UserIdentity>().await.ok()
}
