use super::*;
use crate::config::RETURN_PATH_KEY;
use crate::test_support::{MemoryStorage, NavCall, RecordingNavigator, user};

struct Harness {
    guard: RouteGuard,
    storage: Rc<MemoryStorage>,
    navigator: Rc<RecordingNavigator>,
}

fn harness(storage: MemoryStorage) -> Harness {
    let storage = Rc::new(storage);
    let navigator = Rc::new(RecordingNavigator::default());
    let guard = RouteGuard::new(GuardConfig::default(), storage.clone(), navigator.clone());
    Harness { guard, storage, navigator }
}

fn at(location: &str) -> NavigationIntent {
    NavigationIntent::from_location(location, &GuardConfig::default())
}

fn signed_in() -> AuthState {
    AuthState::resolved(Some(user("u1")))
}

fn signed_out() -> AuthState {
    AuthState::resolved(None)
}

// =============================================================
// Loading phase
// =============================================================

#[test]
fn holds_while_loading_on_any_path() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/jobs"));
    for location in ["/", "/login", "/signup", "/dashboard", "/dashboard/jobs?x=1", "/pricing"] {
        assert_eq!(h.guard.evaluate(&AuthState::pending(), &at(location)), GuardDecision::Hold);
    }
    assert!(h.navigator.calls.borrow().is_empty());
}

#[test]
fn never_navigates_while_loading_across_transitions() {
    let mut h = harness(MemoryStorage::default());
    let sequence = [
        (AuthState::pending(), "/dashboard/jobs"),
        (AuthState::pending(), "/login"),
        (signed_out(), "/login"),
        (AuthState::pending(), "/dashboard"),
        (signed_in(), "/"),
        (AuthState::pending(), "/"),
    ];
    for (auth, location) in sequence {
        let before = h.navigator.calls.borrow().len();
        h.guard.evaluate(&auth, &at(location));
        if auth.loading {
            assert_eq!(h.navigator.calls.borrow().len(), before, "navigated while loading at {location}");
        }
    }
}

// =============================================================
// Signed-out visitors
// =============================================================

#[test]
fn scenario_unauthenticated_deep_link_is_recorded_then_replaced_to_login() {
    let mut h = harness(MemoryStorage::default());
    let decision = h.guard.evaluate(&signed_out(), &at("/dashboard/jobs"));

    assert_eq!(decision, GuardDecision::RedirectToSignIn("/login".to_owned()));
    assert_eq!(*h.navigator.calls.borrow(), vec![NavCall::Replace("/login".to_owned())]);
    assert_eq!(h.storage.value(RETURN_PATH_KEY).as_deref(), Some("/dashboard/jobs"));
}

#[test]
fn signed_out_on_public_path_is_allowed() {
    let mut h = harness(MemoryStorage::default());
    assert_eq!(h.guard.evaluate(&signed_out(), &at("/login")), GuardDecision::Allow);
    assert_eq!(h.guard.evaluate(&signed_out(), &at("/pricing")), GuardDecision::Allow);
    assert!(h.navigator.calls.borrow().is_empty());
}

#[test]
fn missing_user_beats_stale_return_path() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/finance"));
    let decision = h.guard.evaluate(&signed_out(), &at("/dashboard"));
    assert_eq!(decision, GuardDecision::RedirectToSignIn("/login".to_owned()));
}

#[test]
fn resolving_signed_out_after_loading_redirects_once() {
    let mut h = harness(MemoryStorage::default());
    let intent = at("/dashboard/payroll");
    h.guard.evaluate(&AuthState::pending(), &intent);
    h.guard.evaluate(&signed_out(), &intent);
    h.guard.evaluate(&signed_out(), &intent);
    assert_eq!(h.navigator.replacements(), vec!["/login".to_owned()]);
}

// =============================================================
// Signed-in visitors
// =============================================================

#[test]
fn scenario_root_restores_persisted_path_with_query() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/finance?range=8w"));
    let decision = h.guard.evaluate(&signed_in(), &at("/"));
    assert_eq!(decision, GuardDecision::RestoreReturnPath("/dashboard/finance?range=8w".to_owned()));
    assert_eq!(h.navigator.replacements(), vec!["/dashboard/finance?range=8w".to_owned()]);
}

#[test]
fn scenario_login_without_persisted_path_goes_to_landing() {
    let mut h = harness(MemoryStorage::default());
    let decision = h.guard.evaluate(&signed_in(), &at("/login"));
    assert_eq!(decision, GuardDecision::RedirectToLanding("/dashboard".to_owned()));
    assert_eq!(h.navigator.replacements(), vec!["/dashboard".to_owned()]);
}

#[test]
fn signup_is_an_entry_path() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/subcontractors"));
    let decision = h.guard.evaluate(&signed_in(), &at("/signup"));
    assert_eq!(decision, GuardDecision::RestoreReturnPath("/dashboard/subcontractors".to_owned()));
}

#[test]
fn deep_link_reload_does_not_loop() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/finance"));
    let intent = at("/dashboard/jobs?status=Complete");
    h.guard.evaluate(&AuthState::pending(), &intent);
    assert_eq!(h.guard.evaluate(&signed_in(), &intent), GuardDecision::Allow);
    assert!(h.navigator.calls.borrow().is_empty());
}

#[test]
fn signed_in_on_public_non_entry_path_is_allowed() {
    let mut h = harness(MemoryStorage::default());
    assert_eq!(h.guard.evaluate(&signed_in(), &at("/pricing")), GuardDecision::Allow);
}

#[test]
fn unreadable_storage_falls_back_to_landing() {
    let storage = MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/jobs");
    storage.unavailable.set(true);
    let mut h = harness(storage);
    let decision = h.guard.evaluate(&signed_in(), &at("/"));
    assert_eq!(decision, GuardDecision::RedirectToLanding("/dashboard".to_owned()));
}

#[test]
fn tampered_return_path_falls_back_to_landing() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "//evil.example/dashboard"));
    let decision = h.guard.evaluate(&signed_in(), &at("/login"));
    assert_eq!(decision, GuardDecision::RedirectToLanding("/dashboard".to_owned()));
}

#[test]
fn sign_in_round_trip_returns_to_attempted_path() {
    let mut h = harness(MemoryStorage::default());
    h.guard.evaluate(&signed_out(), &at("/dashboard/finance?range=8w"));
    h.guard.evaluate(&signed_out(), &at("/login"));
    let decision = h.guard.evaluate(&signed_in(), &at("/login"));
    assert_eq!(decision, GuardDecision::RestoreReturnPath("/dashboard/finance?range=8w".to_owned()));
}

// =============================================================
// Return-path recording
// =============================================================

#[test]
fn protected_visit_while_signed_in_records_full_path() {
    let mut h = harness(MemoryStorage::default());
    for path in ["/dashboard", "/dashboard/jobs", "/dashboard/finance?range=8w"] {
        h.guard.evaluate(&signed_in(), &at(path));
        assert_eq!(h.storage.value(RETURN_PATH_KEY).as_deref(), Some(path));
    }
}

#[test]
fn protected_visit_is_recorded_while_loading() {
    let mut h = harness(MemoryStorage::default());
    h.guard.evaluate(&AuthState::pending(), &at("/dashboard/calendar"));
    assert_eq!(h.storage.value(RETURN_PATH_KEY).as_deref(), Some("/dashboard/calendar"));
}

#[test]
fn public_visit_does_not_overwrite_return_path() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/jobs"));
    h.guard.evaluate(&signed_out(), &at("/login"));
    assert_eq!(h.storage.value(RETURN_PATH_KEY).as_deref(), Some("/dashboard/jobs"));
    assert_eq!(h.storage.writes.get(), 0);
}

#[test]
fn auth_change_alone_does_not_rewrite_return_path() {
    let mut h = harness(MemoryStorage::default());
    let intent = at("/dashboard/jobs");
    h.guard.evaluate(&AuthState::pending(), &intent);
    h.guard.evaluate(&signed_in(), &intent);
    assert_eq!(h.storage.writes.get(), 1);
}

#[test]
fn restore_reads_value_stored_before_this_pass() {
    let mut h = harness(MemoryStorage::with(RETURN_PATH_KEY, "/dashboard/finance"));
    let decision = h.guard.evaluate(&signed_in(), &at("/"));
    assert_eq!(decision.redirect_target(), Some("/dashboard/finance"));
    assert_eq!(h.storage.writes.get(), 0);
}

// =============================================================
// Idempotence
// =============================================================

#[test]
fn unchanged_inputs_issue_no_further_navigation() {
    let mut h = harness(MemoryStorage::default());
    let intent = at("/dashboard/jobs");
    h.guard.evaluate(&signed_out(), &intent);
    assert_eq!(h.guard.evaluate(&signed_out(), &intent), GuardDecision::Unchanged);
    assert_eq!(h.guard.evaluate(&signed_out(), &intent), GuardDecision::Unchanged);
    assert_eq!(h.navigator.calls.borrow().len(), 1);
    assert_eq!(h.storage.writes.get(), 1);
}

#[test]
fn evaluate_current_reads_navigator_location() {
    let mut h = harness(MemoryStorage::default());
    *h.navigator.location.borrow_mut() = "/dashboard/jobs".to_owned();
    let decision = h.guard.evaluate_current(&signed_out());
    assert_eq!(decision, GuardDecision::RedirectToSignIn("/login".to_owned()));
    assert_eq!(h.navigator.current_path(), "/login");
    assert_eq!(h.guard.evaluate_current(&signed_out()), GuardDecision::Allow);
}

#[test]
fn redirect_onto_current_location_is_suppressed() {
    let storage = Rc::new(MemoryStorage::default());
    let navigator = Rc::new(RecordingNavigator::default());
    let config = GuardConfig { default_landing_path: "/".to_owned(), ..GuardConfig::default() };
    let mut guard = RouteGuard::new(config, storage, navigator.clone());
    let intent = NavigationIntent::from_location("/", guard.config());
    assert_eq!(guard.evaluate(&signed_in(), &intent), GuardDecision::Allow);
    assert!(navigator.calls.borrow().is_empty());
}
