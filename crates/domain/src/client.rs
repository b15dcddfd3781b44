use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventcrm_auth::Department;
use eventcrm_core::{ClientId, DomainError, DomainResult, Entity, UserId};

/// A client of the events company.
///
/// `commercial_contact_id` names the Commercial collaborator who owns the
/// relationship; ownership is reassignable only by Management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub commercial_contact_id: UserId,
    pub created_at: DateTime<Utc>,
    pub last_contact_at: DateTime<Utc>,
    pub version: u64,
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Input for registering a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub id: ClientId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    /// The owning Commercial collaborator.
    pub commercial_contact_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Changes applicable to an existing client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientChange {
    UpdateDetails {
        /// Optional new full name (if None, keep existing).
        full_name: Option<String>,
        /// Optional new email (if None, keep existing).
        email: Option<String>,
        /// Optional new phone (if None, keep existing).
        phone: Option<String>,
        /// Optional new company name (if None, keep existing).
        company_name: Option<String>,
        occurred_at: DateTime<Utc>,
    },
    ReassignCommercial {
        new_commercial_id: UserId,
        /// Department of the new owner, supplied by the caller after lookup.
        new_commercial_department: Department,
        occurred_at: DateTime<Utc>,
    },
}

impl Client {
    /// Validate inputs and produce the initial client state.
    pub fn create(new: NewClient) -> DomainResult<Self> {
        if new.full_name.trim().is_empty() {
            return Err(DomainError::validation("full name cannot be empty"));
        }
        validate_email(&new.email)?;
        if new.phone.trim().is_empty() {
            return Err(DomainError::validation("phone cannot be empty"));
        }
        if new.company_name.trim().is_empty() {
            return Err(DomainError::validation("company name cannot be empty"));
        }

        Ok(Self {
            id: new.id,
            full_name: new.full_name.trim().to_string(),
            email: new.email.trim().to_lowercase(),
            phone: new.phone.trim().to_string(),
            company_name: new.company_name.trim().to_string(),
            commercial_contact_id: new.commercial_contact_id,
            created_at: new.occurred_at,
            last_contact_at: new.occurred_at,
            version: 0,
        })
    }

    /// Compute the next client state for a change.
    pub fn handle(&self, change: &ClientChange) -> DomainResult<Self> {
        match change {
            ClientChange::UpdateDetails {
                full_name,
                email,
                phone,
                company_name,
                occurred_at,
            } => {
                let mut next = self.clone();
                if let Some(full_name) = full_name {
                    if full_name.trim().is_empty() {
                        return Err(DomainError::validation("full name cannot be empty"));
                    }
                    next.full_name = full_name.trim().to_string();
                }
                if let Some(email) = email {
                    validate_email(email)?;
                    next.email = email.trim().to_lowercase();
                }
                if let Some(phone) = phone {
                    if phone.trim().is_empty() {
                        return Err(DomainError::validation("phone cannot be empty"));
                    }
                    next.phone = phone.trim().to_string();
                }
                if let Some(company_name) = company_name {
                    if company_name.trim().is_empty() {
                        return Err(DomainError::validation("company name cannot be empty"));
                    }
                    next.company_name = company_name.trim().to_string();
                }
                next.last_contact_at = *occurred_at;
                Ok(next)
            }
            ClientChange::ReassignCommercial {
                new_commercial_id,
                new_commercial_department,
                occurred_at,
            } => {
                if *new_commercial_department != Department::Commercial {
                    return Err(DomainError::validation(
                        "client owner must be a member of the commercial team",
                    ));
                }
                let mut next = self.clone();
                next.commercial_contact_id = *new_commercial_id;
                next.last_contact_at = *occurred_at;
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
