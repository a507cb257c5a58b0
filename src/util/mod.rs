//! Browser and router adapters for the capability traits.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from the guard and
//! binder so those stay testable with plain fakes.

pub mod browser_storage;
pub mod router;
