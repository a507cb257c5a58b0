//! # dashgate
//!
//! Client-side auth gate and live-collection layer for the business dashboard
//! (jobs, finance, payroll, subcontractors).
//!
//! The crate decides whether a visitor may see a route, where to send them and
//! how to resume their last protected location after reload. It also binds
//! pages to live backend collections through memoized queries, so each logical
//! query owns exactly one subscription that is torn down deterministically.
//!
//! Engines (`auth_observer`, `route_guard`, `query_memo`, `live_collection`)
//! only talk to the outside world through the traits in `net::capability`.
//! `hooks` wires them into Leptos; `util` and `net::session` provide the
//! browser-side capability implementations.

pub mod auth_observer;
pub mod config;
pub mod error;
pub mod hooks;
pub mod live_collection;
pub mod net;
pub mod query_memo;
pub mod return_path;
pub mod route_guard;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// Route `log` output to the browser console and install the panic hook.
///
/// Call once from the hydrate entry point before mounting the app.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
