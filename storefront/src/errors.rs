//! Error types for the storefront.
//!
//! Two layers of errors exist:
//!
//! - [`StoreError`]: failures at the document-store boundary. Backends map
//!   their native failures into these variants.
//! - [`ServiceError`]: the business-layer taxonomy. Services short-circuit on
//!   the first violated rule and report a single human-readable message. The
//!   HTTP layer maps each variant onto a status code (400 validation, 403
//!   authorization, 404 not found, 400 business rule, 500 storage).

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by a document-store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The referenced document does not exist.
    #[error("document not found")]
    NotFound,

    /// A unique constraint (e.g. user email) was violated.
    #[error("duplicate key")]
    Duplicate,

    /// A conditional stock adjustment would have driven stock below zero.
    ///
    /// The check and the decrement happen as one atomic update, so two
    /// concurrent checkouts racing on the same product cannot both succeed.
    #[error("insufficient stock")]
    InsufficientStock,

    /// Backend failure (connection, serialization, ...).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Business-layer errors, each carrying a user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Malformed or out-of-range input, rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// Authentication failed (bad credentials, blocked account).
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to do this.
    #[error("Not authorized")]
    Forbidden,

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A business rule was violated (empty cart, insufficient stock,
    /// invalid status transition, duplicate review, ...).
    #[error("{0}")]
    BusinessRule(String),

    /// Unexpected persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Convenience constructor for business-rule violations.
    pub fn business(message: impl Into<String>) -> Self {
        Self::BusinessRule(message.into())
    }
}

impl From<crate::types::DomainError> for ServiceError {
    fn from(err: crate::types::DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}
