//! `leptos_router` navigation as a [`Navigator`].

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::net::capability::Navigator;

/// Router-backed navigator; replacements do not append history entries.
pub struct RouterNavigator<F> {
    navigate: F,
    pathname: Memo<String>,
    search: Memo<String>,
}

impl<F> RouterNavigator<F>
where
    F: Fn(&str, NavigateOptions),
{
    /// Wrap the closure returned by `use_navigate` and the location memos from
    /// `use_location`.
    pub fn new(navigate: F, pathname: Memo<String>, search: Memo<String>) -> Self {
        Self { navigate, pathname, search }
    }
}

impl<F> Navigator for RouterNavigator<F>
where
    F: Fn(&str, NavigateOptions),
{
    fn current_path(&self) -> String {
        join_location(&self.pathname.get_untracked(), &self.search.get_untracked())
    }

    fn replace(&self, path: &str) {
        (self.navigate)(path, NavigateOptions { replace: true, ..NavigateOptions::default() });
    }

    fn push(&self, path: &str) {
        (self.navigate)(path, NavigateOptions::default());
    }
}

/// Join router parts into `path?query`; `search` may carry a leading `?`.
pub fn join_location(pathname: &str, search: &str) -> String {
    let search = search.strip_prefix('?').unwrap_or(search);
    if search.is_empty() { pathname.to_owned() } else { format!("{pathname}?{search}") }
}
