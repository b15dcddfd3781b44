//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a reason code the CLI can render directly. Keep this
/// focused on deterministic policy/lifecycle failures; infrastructure
/// concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The acting identity is not permitted to perform the action.
    #[error("insufficient permission: {0}")]
    InsufficientPermission(String),

    /// The requested state transition is not in the transition table.
    #[error("illegal transition: {0}")]
    IllegalTransition(String),

    /// A contract cannot be marked fully paid while money is still owed.
    #[error("outstanding balance: {amount_due} cents still due")]
    OutstandingBalance { amount_due: u64 },

    /// An event was requested for a contract that has not been signed.
    #[error("contract is not signed")]
    ContractNotSigned,

    /// Conflicting concurrent writes exhausted the dispatcher's retries.
    #[error("concurrent modification")]
    ConcurrentModification,

    /// The referenced entity does not exist.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_permission(msg: impl Into<String>) -> Self {
        Self::InsufficientPermission(msg.into())
    }

    pub fn illegal_transition(msg: impl Into<String>) -> Self {
        Self::IllegalTransition(msg.into())
    }

    pub fn unknown_entity(msg: impl Into<String>) -> Self {
        Self::UnknownEntity(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
