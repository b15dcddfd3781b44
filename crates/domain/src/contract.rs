use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventcrm_core::{ClientId, ContractId, DomainError, DomainResult, Entity, UserId};

/// A contract between the company and a client.
///
/// # Invariants
/// - `signed` is monotonic: a signed contract never reverts to unsigned.
/// - `amount_due` only decreases, and never below zero.
/// - `fully_paid` may only become true while `amount_due == 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub client_id: ClientId,
    /// Copied from the owning client at creation.
    pub commercial_contact_id: UserId,
    /// Total contract value in smallest currency unit (e.g., cents).
    pub total_amount: u64,
    /// Remaining balance in smallest currency unit (e.g., cents).
    pub amount_due: u64,
    pub signed: bool,
    pub fully_paid: bool,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl Entity for Contract {
    type Id = ContractId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Input for drawing up a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContract {
    pub id: ContractId,
    pub client_id: ClientId,
    /// The owning client's commercial contact; the dispatcher copies this
    /// from the loaded client.
    pub commercial_contact_id: UserId,
    pub total_amount: u64,
    pub amount_due: u64,
    /// Contracts negotiated on the spot may be created already signed.
    pub signed: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Changes applicable to an existing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractChange {
    /// Request the signed flag. Signing is one-way; repeating the current
    /// value is a no-op success.
    SetSigned(bool),
    /// Record a payment against the remaining balance.
    RecordPayment { amount: u64 },
    /// Mark the contract settled. Legal only once nothing is due.
    SetFullyPaid,
}

impl Contract {
    /// Validate inputs and produce the initial contract state.
    pub fn create(new: NewContract) -> DomainResult<Self> {
        if new.amount_due > new.total_amount {
            return Err(DomainError::validation(
                "amount due cannot exceed the total amount",
            ));
        }

        Ok(Self {
            id: new.id,
            client_id: new.client_id,
            commercial_contact_id: new.commercial_contact_id,
            total_amount: new.total_amount,
            amount_due: new.amount_due,
            signed: new.signed,
            fully_paid: false,
            created_at: new.occurred_at,
            version: 0,
        })
    }

    /// Compute the next contract state for a change.
    ///
    /// Transitions outside the table reject; already-applied transitions
    /// are no-op successes.
    pub fn handle(&self, change: &ContractChange) -> DomainResult<Self> {
        match change {
            ContractChange::SetSigned(signed) => {
                if self.signed && !signed {
                    return Err(DomainError::illegal_transition(
                        "signed contracts cannot revert to unsigned",
                    ));
                }
                let mut next = self.clone();
                next.signed = *signed;
                Ok(next)
            }
            ContractChange::RecordPayment { amount } => {
                if *amount == 0 {
                    return Err(DomainError::validation("payment amount must be positive"));
                }
                if *amount > self.amount_due {
                    return Err(DomainError::validation(
                        "payment exceeds the remaining amount due",
                    ));
                }
                let mut next = self.clone();
                next.amount_due -= amount;
                Ok(next)
            }
            ContractChange::SetFullyPaid => {
                if self.fully_paid {
                    return Ok(self.clone());
                }
                if self.amount_due > 0 {
                    return Err(DomainError::OutstandingBalance {
                        amount_due: self.amount_due,
                    });
                }
                let mut next = self.clone();
                next.fully_paid = true;
                Ok(next)
            }
        }
    }
}
