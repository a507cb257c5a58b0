//! Observable state values handed to UI consumers.
//!
//! DESIGN
//! ======
//! State is split by concern (`auth`, `navigation`, `collection`) so the guard
//! and binder each depend on one small, read-only model.

pub mod auth;
pub mod collection;
pub mod navigation;
