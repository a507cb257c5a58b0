//! Live binding of a memoized query to a backend subscription.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pages hold one [`LiveCollection`] per list they render (jobs, payroll
//! entries, subcontractors). Each render hands it the identity produced by a
//! [`QueryMemo`](crate::query_memo::QueryMemo); the binder reopens the backend
//! subscription only when that identity changes.
//!
//! LIFECYCLE
//! =========
//! Idle -> Loading -> Ready | Failed, with teardown on identity change or
//! drop. The previous subscription is always closed before the next one is
//! opened, so one binder never holds two subscriptions. Each subscription gets
//! its own liveness flag, cleared before the backend's unsubscribe runs; late
//! deliveries from a closed or superseded subscription are dropped.

#[cfg(test)]
#[path = "live_collection_test.rs"]
mod live_collection_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::SubscriptionError;
use crate::net::capability::{CollectionBackend, Unsubscribe};
use crate::query_memo::QueryIdentity;
use crate::state::collection::SubscriptionResult;

type Listener<T> = Rc<dyn Fn(&SubscriptionResult<T>)>;

struct Shared<T> {
    result: SubscriptionResult<T>,
    listener: Option<Listener<T>>,
}

struct ActiveSubscription {
    alive: Rc<Cell<bool>>,
    handle: Unsubscribe,
}

pub struct LiveCollection<T> {
    backend: Rc<dyn CollectionBackend<T>>,
    bound: Option<QueryIdentity>,
    active: Option<ActiveSubscription>,
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T: Clone + 'static> LiveCollection<T> {
    pub fn new(backend: Rc<dyn CollectionBackend<T>>) -> Self {
        Self {
            backend,
            bound: None,
            active: None,
            shared: Rc::new(RefCell::new(Shared { result: SubscriptionResult::Idle, listener: None })),
        }
    }

    /// Call `f` after every result change, replacing any previous listener.
    pub fn on_change(&self, f: impl Fn(&SubscriptionResult<T>) + 'static) {
        self.shared.borrow_mut().listener = Some(Rc::new(f));
    }

    pub fn result(&self) -> SubscriptionResult<T> {
        self.shared.borrow().result.clone()
    }

    /// Bind to `identity`, resubscribing only if it differs from the bound one.
    pub fn bind(&mut self, identity: &QueryIdentity) -> SubscriptionResult<T> {
        if self.bound.as_ref() == Some(identity) {
            return self.result();
        }

        self.close();
        self.bound = Some(identity.clone());

        let Some(query) = identity.description() else {
            publish(&self.shared, SubscriptionResult::Idle);
            return self.result();
        };

        publish(&self.shared, SubscriptionResult::Loading);
        log::debug!("subscribing to {query}");

        let alive = Rc::new(Cell::new(true));
        let on_snapshot = {
            let alive = alive.clone();
            let shared: Weak<RefCell<Shared<T>>> = Rc::downgrade(&self.shared);
            move |rows: Vec<T>| {
                if !alive.get() {
                    return;
                }
                if let Some(shared) = shared.upgrade() {
                    publish(&shared, SubscriptionResult::Ready(rows));
                }
            }
        };
        let on_error = {
            let alive = alive.clone();
            let shared: Weak<RefCell<Shared<T>>> = Rc::downgrade(&self.shared);
            let collection = query.collection.clone();
            move |error: SubscriptionError| {
                if !alive.replace(false) {
                    return;
                }
                log::warn!("subscription to {collection} failed: {error}");
                if let Some(shared) = shared.upgrade() {
                    publish(&shared, SubscriptionResult::Failed(error));
                }
            }
        };

        let handle = self.backend.subscribe(query, Box::new(on_snapshot), Box::new(on_error));
        self.active = Some(ActiveSubscription { alive, handle });
        self.result()
    }
}

impl<T> LiveCollection<T> {
    pub fn bound(&self) -> Option<&QueryIdentity> {
        self.bound.as_ref()
    }

    pub fn has_active_subscription(&self) -> bool {
        self.active.is_some()
    }

    /// Close the open subscription; the result keeps its last value.
    pub fn teardown(&mut self) {
        self.close();
        self.bound = None;
    }

    fn close(&mut self) {
        if let Some(active) = self.active.take() {
            active.alive.set(false);
            active.handle.unsubscribe();
        }
    }
}

impl<T> Drop for LiveCollection<T> {
    fn drop(&mut self) {
        self.close();
    }
}

fn publish<T: Clone>(shared: &Rc<RefCell<Shared<T>>>, next: SubscriptionResult<T>) {
    let notify = {
        let mut shared = shared.borrow_mut();
        shared.result = next;
        shared.listener.clone().map(|listener| (listener, shared.result.clone()))
    };
    if let Some((listener, result)) = notify {
        listener(&result);
    }
}
