use eventcrm_core::{DomainError, DomainResult};

/// The verdict emitted by the permission policy for a single action.
///
/// Denial is a normal return value, not a fault: the engine never errors
/// for "unauthorized", it answers the question. The deny reason is one of
/// the fixed reason codes, surfaced verbatim by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The action is permitted.
    Allow,

    /// The action is denied, with a machine-readable reason code.
    Deny { reason: DomainError },
}

impl Decision {
    /// Deny for lack of permission, with a human-usable detail.
    pub fn deny(detail: impl Into<String>) -> Self {
        Self::Deny {
            reason: DomainError::InsufficientPermission(detail.into()),
        }
    }

    /// Deny with a specific reason code from the taxonomy.
    pub fn deny_with(reason: DomainError) -> Self {
        Self::Deny { reason }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert to a result for `?`-style sequencing in the dispatcher.
    pub fn into_result(self) -> DomainResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny { reason } => Err(reason),
        }
    }
}
