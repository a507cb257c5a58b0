//! Scripted capability fakes shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{AuthResolutionError, StorageError, SubscriptionError};
use crate::net::capability::{
    AuthCallback, CollectionBackend, DurableStorage, ErrorCallback, IdentityProvider, Navigator, SnapshotCallback,
    Unsubscribe,
};
use crate::net::types::{QueryDescription, UserIdentity};

// =============================================================
// Identity provider
// =============================================================

/// Provider that keeps its listener so tests decide when the user resolves.
#[derive(Default)]
pub struct FakeProvider {
    listener: Rc<RefCell<Option<Rc<dyn Fn(Option<UserIdentity>)>>>>,
    pub registrations: Cell<u32>,
    pub unsubscribes: Rc<Cell<u32>>,
    pub fail_with: RefCell<Option<AuthResolutionError>>,
    pub answer_immediately: RefCell<Option<Option<UserIdentity>>>,
}

impl FakeProvider {
    pub fn emit(&self, user: Option<UserIdentity>) {
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(user);
        }
    }

    /// Emit through a listener captured before teardown, as a late provider would.
    pub fn stale_listener(&self) -> Option<Rc<dyn Fn(Option<UserIdentity>)>> {
        self.listener.borrow().clone()
    }
}

impl IdentityProvider for FakeProvider {
    fn observe_current_user(&self, callback: AuthCallback) -> Result<Unsubscribe, AuthResolutionError> {
        if let Some(e) = self.fail_with.borrow().clone() {
            return Err(e);
        }
        self.registrations.set(self.registrations.get() + 1);
        let callback: Rc<dyn Fn(Option<UserIdentity>)> = Rc::from(callback);
        *self.listener.borrow_mut() = Some(callback.clone());
        if let Some(user) = self.answer_immediately.borrow().clone() {
            callback(user);
        }
        let unsubscribes = self.unsubscribes.clone();
        Ok(Unsubscribe::new(move || unsubscribes.set(unsubscribes.get() + 1)))
    }
}

pub fn user(id: &str) -> UserIdentity {
    UserIdentity::new(id)
}

// =============================================================
// Collection backend
// =============================================================

/// Event log entry for [`FakeBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    Subscribe(String),
    Unsubscribe(String),
}

struct OpenSubscription<T> {
    query: QueryDescription,
    on_snapshot: Rc<dyn Fn(Vec<T>)>,
    on_error: Rc<dyn Fn(SubscriptionError)>,
}

/// Backend that records subscribe/unsubscribe order and lets tests push deliveries.
pub struct FakeBackend<T> {
    pub events: Rc<RefCell<Vec<BackendEvent>>>,
    subscriptions: Rc<RefCell<Vec<OpenSubscription<T>>>>,
    active: Rc<Cell<i32>>,
    pub max_active: Rc<Cell<i32>>,
    pub immediate: RefCell<Option<Vec<T>>>,
}

impl<T> Default for FakeBackend<T> {
    fn default() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
            subscriptions: Rc::new(RefCell::new(Vec::new())),
            active: Rc::new(Cell::new(0)),
            max_active: Rc::new(Cell::new(0)),
            immediate: RefCell::new(None),
        }
    }
}

impl<T: Clone + 'static> FakeBackend<T> {
    pub fn subscribe_count(&self) -> usize {
        self.events.borrow().iter().filter(|e| matches!(e, BackendEvent::Subscribe(_))).count()
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.events.borrow().iter().filter(|e| matches!(e, BackendEvent::Unsubscribe(_))).count()
    }

    pub fn active(&self) -> i32 {
        self.active.get()
    }

    /// Deliver `rows` on the `index`-th subscription ever opened.
    pub fn deliver(&self, index: usize, rows: Vec<T>) {
        let callback = self.subscriptions.borrow()[index].on_snapshot.clone();
        callback(rows);
    }

    pub fn fail(&self, index: usize, error: SubscriptionError) {
        let callback = self.subscriptions.borrow()[index].on_error.clone();
        callback(error);
    }

    pub fn query(&self, index: usize) -> QueryDescription {
        self.subscriptions.borrow()[index].query.clone()
    }
}

impl<T: Clone + 'static> CollectionBackend<T> for FakeBackend<T> {
    fn subscribe(&self, query: &QueryDescription, on_snapshot: SnapshotCallback<T>, on_error: ErrorCallback)
    -> Unsubscribe {
        let label = query.to_string();
        self.events.borrow_mut().push(BackendEvent::Subscribe(label.clone()));
        self.active.set(self.active.get() + 1);
        self.max_active.set(self.max_active.get().max(self.active.get()));

        let on_snapshot: Rc<dyn Fn(Vec<T>)> = Rc::from(on_snapshot);
        self.subscriptions.borrow_mut().push(OpenSubscription {
            query: query.clone(),
            on_snapshot: on_snapshot.clone(),
            on_error: Rc::from(on_error),
        });
        if let Some(rows) = self.immediate.borrow().clone() {
            on_snapshot(rows);
        }

        let events = self.events.clone();
        let active = self.active.clone();
        Unsubscribe::new(move || {
            events.borrow_mut().push(BackendEvent::Unsubscribe(label));
            active.set(active.get() - 1);
        })
    }
}

// =============================================================
// Storage and navigation
// =============================================================

#[derive(Default)]
pub struct MemoryStorage {
    pub items: RefCell<HashMap<String, String>>,
    pub unavailable: Cell<bool>,
    pub writes: Cell<u32>,
}

impl MemoryStorage {
    pub fn with(key: &str, value: &str) -> Self {
        let storage = Self::default();
        storage.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        storage
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl DurableStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable.get() {
            return Err(StorageError::Unavailable);
        }
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable.get() {
            return Err(StorageError::Unavailable);
        }
        self.writes.set(self.writes.get() + 1);
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NavCall {
    Replace(String),
    Push(String),
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub calls: RefCell<Vec<NavCall>>,
    pub location: RefCell<String>,
}

impl RecordingNavigator {
    pub fn replacements(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                NavCall::Replace(p) => Some(p.clone()),
                NavCall::Push(_) => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.location.borrow().clone()
    }

    fn replace(&self, path: &str) {
        self.calls.borrow_mut().push(NavCall::Replace(path.to_owned()));
        *self.location.borrow_mut() = path.to_owned();
    }

    fn push(&self, path: &str) {
        self.calls.borrow_mut().push(NavCall::Push(path.to_owned()));
        *self.location.borrow_mut() = path.to_owned();
    }
}
