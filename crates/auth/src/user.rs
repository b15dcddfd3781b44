//! User entity for account management.
//!
//! Collaborator accounts are the only entities the CRM ever hard-deletes
//! (Management-only). Credentials are owned entirely by the external
//! authentication collaborator — a [`User`] here carries no secret material.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventcrm_core::{DomainError, DomainResult, Entity, UserId};

use crate::Department;

/// A collaborator account.
///
/// # Invariants
/// - A user belongs to exactly one department; the department is immutable
///   after creation (no change reaches it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub employee_number: String,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Input for creating a collaborator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub employee_number: String,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub created_at: DateTime<Utc>,
}

/// Changes applicable to an existing account.
///
/// The department is deliberately absent: it cannot change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserChange {
    UpdateProfile {
        /// Optional new name (if None, keep existing).
        name: Option<String>,
        /// Optional new email (if None, keep existing).
        email: Option<String>,
    },
}

impl User {
    /// Validate inputs and produce the initial account state.
    pub fn create(new: NewUser) -> DomainResult<Self> {
        if new.employee_number.trim().is_empty() {
            return Err(DomainError::validation("employee number cannot be empty"));
        }
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        validate_email(&new.email)?;

        Ok(Self {
            id: new.id,
            employee_number: new.employee_number.trim().to_string(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_lowercase(),
            department: new.department,
            created_at: new.created_at,
            version: 0,
        })
    }

    /// Compute the next account state for a change.
    ///
    /// Pure: current state in, next state out. The store owns version bumps.
    pub fn handle(&self, change: &UserChange) -> DomainResult<Self> {
        match change {
            UserChange::UpdateProfile { name, email } => {
                let mut next = self.clone();
                if let Some(name) = name {
                    if name.trim().is_empty() {
                        return Err(DomainError::validation("name cannot be empty"));
                    }
                    next.name = name.trim().to_string();
                }
                if let Some(email) = email {
                    validate_email(email)?;
                    next.email = email.trim().to_lowercase();
                }
                Ok(next)
            }
        }
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(())
}
