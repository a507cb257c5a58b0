//! Typed view over a backend that delivers raw JSON documents.
//!
//! Document databases hand back loosely-typed documents; pages want rows such
//! as `Job` or `PayrollEntry`. [`JsonRows`] decodes every snapshot before it
//! reaches the binder. One undecodable document fails the whole snapshot so a
//! page never renders a silently truncated list.

#[cfg(test)]
#[path = "json_rows_test.rs"]
mod json_rows_test;

use std::marker::PhantomData;
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::error::SubscriptionError;
use crate::net::capability::{CollectionBackend, ErrorCallback, SnapshotCallback, Unsubscribe};
use crate::net::types::QueryDescription;

pub struct JsonRows<B, T> {
    inner: B,
    _rows: PhantomData<fn() -> T>,
}

impl<B, T> JsonRows<B, T> {
    pub fn new(inner: B) -> Self {
        Self { inner, _rows: PhantomData }
    }
}

impl<B, T> CollectionBackend<T> for JsonRows<B, T>
where
    B: CollectionBackend<serde_json::Value>,
    T: DeserializeOwned + 'static,
{
    fn subscribe(&self, query: &QueryDescription, on_snapshot: SnapshotCallback<T>, on_error: ErrorCallback)
    -> Unsubscribe {
        let on_error: Rc<dyn Fn(SubscriptionError)> = Rc::from(on_error);
        let decode_error = on_error.clone();
        let collection = query.collection.clone();
        self.inner.subscribe(
            query,
            Box::new(move |docs| match decode_rows::<T>(docs) {
                Ok(rows) => on_snapshot(rows),
                Err(e) => {
                    log::warn!("dropping snapshot for {collection}: {e}");
                    decode_error(e);
                }
            }),
            Box::new(move |e| on_error(e)),
        )
    }
}

/// Decode every document into `T`.
///
/// # Errors
///
/// Returns [`SubscriptionError::Decode`] naming the first failing index.
pub fn decode_rows<T: DeserializeOwned>(docs: Vec<serde_json::Value>) -> Result<Vec<T>, SubscriptionError> {
    docs.into_iter()
        .enumerate()
        .map(|(i, doc)| serde_json::from_value(doc).map_err(|e| SubscriptionError::Decode(format!("row {i}: {e}"))))
        .collect()
}
