//! Stable query identities from dependency tuples.
//!
//! DESIGN
//! ======
//! A [`QueryMemo`] sits at one call site and remembers the last dependency
//! tuple it saw. Equal tuples hand back the cached [`QueryIdentity`] without
//! rebuilding the query, which is what keeps the live-collection binder from
//! reopening subscriptions on every re-render. The gate is plain data
//! comparison and knows nothing about rendering.

#[cfg(test)]
#[path = "query_memo_test.rs"]
mod query_memo_test;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::net::types::QueryDescription;

// =============================================================================
// DEPENDENCIES
// =============================================================================

/// One element of a dependency tuple.
///
/// Scalars compare by value. `Float` compares by bit pattern, so `NaN` equals
/// itself and `0.0` differs from `-0.0`. `Ref` compares by pointer identity.
#[derive(Clone)]
pub enum Dep {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Ref(Rc<dyn Any>),
}

impl Dep {
    /// Wrap a shared handle (backend client, user record) for identity comparison.
    pub fn handle<T: Any>(handle: &Rc<T>) -> Self {
        let handle: Rc<dyn Any> = handle.clone();
        Self::Ref(handle)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl PartialEq for Dep {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Ref(v) => write!(f, "Ref({:p})", Rc::as_ptr(v)),
        }
    }
}

impl From<bool> for Dep {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Dep {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Dep {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Dep {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Dep {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Dep {
    fn from(value: &str) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<String> for Dep {
    fn from(value: String) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl<T: Into<Dep>> From<Option<T>> for Dep {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// Opaque token naming one logical query.
///
/// Two identities are equal only if they came from the same memoization, never
/// because their descriptions happen to match.
#[derive(Clone, Debug)]
pub enum QueryIdentity {
    /// Some dependency is not available yet; no subscription should open.
    Idle,
    Query(Rc<MemoizedQuery>),
}

#[derive(Debug)]
pub struct MemoizedQuery {
    token: Uuid,
    description: QueryDescription,
}

impl QueryIdentity {
    pub fn description(&self) -> Option<&QueryDescription> {
        match self {
            Self::Idle => None,
            Self::Query(query) => Some(&query.description),
        }
    }

    pub fn token(&self) -> Option<Uuid> {
        match self {
            Self::Idle => None,
            Self::Query(query) => Some(query.token),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl PartialEq for QueryIdentity {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle, Self::Idle) => true,
            (Self::Query(a), Self::Query(b)) => a.token == b.token,
            _ => false,
        }
    }
}

impl Eq for QueryIdentity {}

// =============================================================================
// MEMO
// =============================================================================

/// Per-call-site cache of the last dependency tuple and its identity.
#[derive(Default)]
pub struct QueryMemo {
    cached: Option<(Vec<Dep>, QueryIdentity)>,
    recipe_runs: u64,
}

impl QueryMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity for `deps`, running `recipe` only when the tuple changed.
    ///
    /// Any [`Dep::Null`] yields [`QueryIdentity::Idle`] without running the
    /// recipe.
    pub fn memoize<F>(&mut self, deps: Vec<Dep>, recipe: F) -> QueryIdentity
    where
        F: FnOnce() -> QueryDescription,
    {
        if let Some((cached_deps, identity)) = &self.cached {
            if *cached_deps == deps {
                return identity.clone();
            }
        }

        let identity = if deps.iter().any(Dep::is_null) {
            QueryIdentity::Idle
        } else {
            self.recipe_runs += 1;
            let description = recipe();
            log::debug!("memoized new query: {description}");
            QueryIdentity::Query(Rc::new(MemoizedQuery { token: Uuid::new_v4(), description }))
        };
        self.cached = Some((deps, identity.clone()));
        identity
    }

    /// Identity returned by the most recent [`QueryMemo::memoize`] call.
    pub fn current(&self) -> Option<&QueryIdentity> {
        self.cached.as_ref().map(|(_, identity)| identity)
    }

    /// How many times a recipe has been run at this call site.
    pub fn recipe_runs(&self) -> u64 {
        self.recipe_runs
    }
}
