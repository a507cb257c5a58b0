//! Boundary with external services.
//!
//! SYSTEM CONTEXT
//! ==============
//! `capability` defines what this crate consumes from the identity provider,
//! document backend, storage and router; `types` holds the DTOs crossing that
//! boundary; `session` and `json_rows` are concrete adapters.

pub mod capability;
pub mod json_rows;
pub mod session;
pub mod types;
