//! Error types for the auth gate and live-collection layer.
//!
//! ERROR HANDLING
//! ==============
//! None of these errors escape the component that hit them. Auth and storage
//! failures are folded into safe defaults (signed out, no return path), while
//! subscription failures are carried to the caller inside
//! [`SubscriptionResult::Failed`](crate::state::collection::SubscriptionResult).

/// The identity provider could not establish who the visitor is.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthResolutionError {
    /// Listener registration was rejected by the provider.
    #[error("identity provider rejected listener registration: {0}")]
    Registration(String),
    /// The provider is not reachable in this environment.
    #[error("identity provider unavailable")]
    Unavailable,
}

/// A backend collection query failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    /// Generic backend failure (network, malformed query, internal error).
    #[error("backend error ({code}): {message}")]
    Backend { code: String, message: String },
    /// Security rules denied read access to the collection.
    #[error("permission denied for collection {collection}")]
    PermissionDenied { collection: String },
    /// A delivered document could not be decoded into the row type.
    #[error("failed to decode row: {0}")]
    Decode(String),
}

/// Durable client-side storage could not be read or written.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Storage is disabled or absent in this browsing context.
    #[error("durable storage unavailable")]
    Unavailable,
    /// The storage call itself failed (quota, security error, ...).
    #[error("storage access failed: {0}")]
    Io(String),
}

/// Invalid [`GuardConfig`](crate::config::GuardConfig) document or value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse guard config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be an absolute path, got {value:?}")]
    RelativePath { field: &'static str, value: String },
    #[error("{field} {value:?} lies inside a protected prefix")]
    ProtectedEntryPath { field: &'static str, value: String },
    #[error("return path key must not be empty")]
    EmptyKey,
}
