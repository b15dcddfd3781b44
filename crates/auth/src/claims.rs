use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventcrm_core::UserId;

use crate::{Department, Identity};

/// Session claims model (transport-agnostic).
///
/// This is the minimal set of claims the core expects once a token has been
/// decoded/verified by whatever transport/security layer is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / acting user identifier.
    pub sub: UserId,

    /// Department granted for the session.
    pub department: Department,

    /// Display name for presentation.
    pub display_name: String,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate session claims and produce the [`Identity`].
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// is intentionally outside this crate.
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<Identity, TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }

    Ok(Identity::new(
        claims.sub,
        claims.department,
        claims.display_name.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims_at(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            sub: UserId::new(),
            department: Department::Commercial,
            display_name: "Alice".to_string(),
            issued_at,
            expires_at,
        }
    }

    #[test]
    fn valid_claims_yield_identity() {
        let now = Utc::now();
        let claims = claims_at(now - Duration::hours(1), now + Duration::hours(23));

        let identity = validate_claims(&claims, now).unwrap();
        assert_eq!(identity.user_id, claims.sub);
        assert_eq!(identity.department, Department::Commercial);
        assert_eq!(identity.display_name, "Alice");
    }

    #[test]
    fn expired_claims_are_rejected() {
        let now = Utc::now();
        let claims = claims_at(now - Duration::hours(25), now - Duration::hours(1));

        let err = validate_claims(&claims, now).unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn future_claims_are_rejected() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::hours(1), now + Duration::hours(24));

        let err = validate_claims(&claims, now).unwrap_err();
        assert_eq!(err, TokenValidationError::NotYetValid);
    }

    #[test]
    fn inverted_time_window_is_rejected() {
        let now = Utc::now();
        let claims = claims_at(now + Duration::hours(1), now - Duration::hours(1));

        let err = validate_claims(&claims, now).unwrap_err();
        assert_eq!(err, TokenValidationError::InvalidTimeWindow);
    }
}
