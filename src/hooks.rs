//! Leptos bindings for the auth observer, route guard and live collections.
//!
//! SYSTEM CONTEXT
//! ==============
//! These are the only functions pages call. Each one owns an engine from this
//! crate inside the current reactive owner, mirrors its state into a signal,
//! and tears it down in `on_cleanup` so unmounting a page closes its listener
//! or subscription before anything else can be delivered.
//!
//! Engines are `!Send`, so they live in local `StoredValue`s.

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;

use std::rc::Rc;

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};

use crate::auth_observer::AuthObserver;
use crate::config::GuardConfig;
use crate::live_collection::LiveCollection;
use crate::net::capability::{CollectionBackend, DurableStorage, IdentityProvider, Navigator};
use crate::net::types::QueryDescription;
use crate::query_memo::{Dep, QueryMemo};
use crate::route_guard::RouteGuard;
use crate::state::auth::AuthState;
use crate::state::collection::SubscriptionResult;
use crate::state::navigation::NavigationIntent;
use crate::util::router::RouterNavigator;

/// Mount the auth observer for this tree and provide its state as context.
///
/// Call once near the application root, before [`install_route_guard`].
pub fn provide_auth_state(provider: Rc<dyn IdentityProvider>) -> RwSignal<AuthState> {
    let auth = RwSignal::new(AuthState::pending());
    let observer = AuthObserver::mount(provider.as_ref());
    auth.set(observer.state());
    observer.watch(move |state| auth.set(state.clone()));

    let observer = StoredValue::new_local(observer);
    on_cleanup(move || {
        let _ = observer.try_update_value(AuthObserver::unmount);
    });

    provide_context(auth);
    auth
}

/// Current auth state provided by [`provide_auth_state`].
pub fn use_auth_state() -> ReadSignal<AuthState> {
    expect_context::<RwSignal<AuthState>>().read_only()
}

/// Install the route guard effect for the whole router tree.
///
/// Must run inside `<Router>` and after [`provide_auth_state`]; re-evaluates
/// whenever the auth state, path or query string changes.
pub fn install_route_guard(config: GuardConfig, storage: Rc<dyn DurableStorage>) {
    let auth = expect_context::<RwSignal<AuthState>>();
    let location = use_location();
    let pathname = location.pathname;
    let search = location.search;
    let navigator: Rc<dyn Navigator> = Rc::new(RouterNavigator::new(use_navigate(), pathname, search));
    let guard = StoredValue::new_local(RouteGuard::new(config, storage, navigator));

    Effect::new(move || {
        let state = auth.get();
        let path = pathname.get();
        let query = search.get();
        guard.update_value(|guard| {
            let intent = NavigationIntent::from_parts(&path, &query, guard.config());
            guard.evaluate(&state, &intent);
        });
    });
}

/// Live result of the query built by `recipe` from the tuple returned by `deps`.
///
/// `deps` runs inside an effect, so signals it reads (the current user, a
/// status filter) are the only triggers; `recipe` runs untracked and only
/// when the tuple changed.
pub fn use_live_collection<T, D, R>(
    backend: Rc<dyn CollectionBackend<T>>,
    deps: D,
    recipe: R,
) -> ReadSignal<SubscriptionResult<T>>
where
    T: Clone + Send + Sync + 'static,
    D: Fn() -> Vec<Dep> + 'static,
    R: Fn() -> QueryDescription + 'static,
{
    let result = RwSignal::new(SubscriptionResult::Idle);
    let binder = LiveCollection::new(backend);
    binder.on_change(move |next| result.set(next.clone()));

    let binder = StoredValue::new_local(binder);
    let memo = StoredValue::new_local(QueryMemo::new());

    Effect::new(move || {
        let deps = deps();
        let identity = untrack(|| memo.try_update_value(|memo| memo.memoize(deps, &recipe)));
        if let Some(identity) = identity {
            let _ = binder.try_update_value(|binder| binder.bind(&identity));
        }
    });

    on_cleanup(move || {
        let _ = binder.try_update_value(LiveCollection::teardown);
    });

    result.read_only()
}

/// Dependency for the signed-in user's id; `Null` while loading or signed out.
pub fn user_dep(auth: &AuthState) -> Dep {
    Dep::from(auth.user_id())
}
