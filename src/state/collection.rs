//! Three-state result of a live collection subscription.
//!
//! DESIGN
//! ======
//! The enum makes "exactly one of loading, data, error" structural instead of a
//! convention over three optional fields. Accessors give pages the flat view
//! they render from.

#[cfg(test)]
#[path = "collection_test.rs"]
mod collection_test;

use crate::error::SubscriptionError;

#[derive(Clone, Debug, PartialEq)]
pub enum SubscriptionResult<T> {
    /// No query to run yet (a dependency such as the user is missing).
    Idle,
    /// Subscription opened, first delivery not yet received.
    Loading,
    /// Full current result set from the latest snapshot.
    Ready(Vec<T>),
    /// Backend reported an error; not retried.
    Failed(SubscriptionError),
}

impl<T> Default for SubscriptionResult<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> SubscriptionResult<T> {
    /// Rows of the latest snapshot; `None` while idle, loading or failed.
    pub fn data(&self) -> Option<&[T]> {
        match self {
            Self::Ready(rows) => Some(rows.as_slice()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&SubscriptionError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
