use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventcrm_auth::Department;
use eventcrm_core::{ContractId, DomainError, DomainResult, Entity, EventId, UserId};

use crate::Contract;

/// Event status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Unassigned,
    Assigned,
    Completed,
}

/// An event organized for a signed contract.
///
/// # Invariants
/// - An event exists only for a contract that was signed at creation time.
/// - `support_contact_id` is set if and only if `status != Unassigned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub contract_id: ContractId,
    pub support_contact_id: Option<UserId>,
    pub status: EventStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: String,
    pub attendees: u32,
    pub notes: Option<String>,
    pub version: u64,
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Input for planning an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub id: EventId,
    pub contract_id: ContractId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: String,
    pub attendees: u32,
    pub notes: Option<String>,
}

/// Changes applicable to an existing event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventChange {
    /// Assign (or reassign) the event to a support collaborator.
    AssignSupport {
        support_id: UserId,
        /// Department of the assignee, supplied by the caller after lookup.
        support_department: Department,
    },
    /// Close out the event once it has taken place.
    Complete { actor: UserId },
    /// Update the logistics of the event.
    UpdateDetails {
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
        location: Option<String>,
        attendees: Option<u32>,
        notes: Option<String>,
    },
}

impl Event {
    /// Validate inputs against the owning contract and produce the initial
    /// event state.
    ///
    /// The signed-contract gate lives here, independent of the permission
    /// verdict: even a caller the permission policy allowed cannot attach an
    /// event to an unsigned contract. Creation-time precondition only —
    /// events are not retroactively invalidated if the contract is later
    /// disputed.
    pub fn create(new: NewEvent, contract: &Contract) -> DomainResult<Self> {
        if contract.id != new.contract_id {
            return Err(DomainError::validation(
                "event does not reference the loaded contract",
            ));
        }
        if !contract.signed {
            return Err(DomainError::ContractNotSigned);
        }
        validate_schedule(new.starts_at, new.ends_at)?;
        validate_attendees(new.attendees)?;
        if new.location.trim().is_empty() {
            return Err(DomainError::validation("location cannot be empty"));
        }

        Ok(Self {
            id: new.id,
            contract_id: new.contract_id,
            support_contact_id: None,
            status: EventStatus::Unassigned,
            starts_at: new.starts_at,
            ends_at: new.ends_at,
            location: new.location.trim().to_string(),
            attendees: new.attendees,
            notes: new.notes,
            version: 0,
        })
    }

    /// Compute the next event state for a change.
    ///
    /// Transitions outside the table reject with `IllegalTransition`;
    /// already-applied transitions are no-op successes.
    pub fn handle(&self, change: &EventChange) -> DomainResult<Self> {
        match change {
            EventChange::AssignSupport {
                support_id,
                support_department,
            } => self.handle_assign(*support_id, *support_department),
            EventChange::Complete { actor } => self.handle_complete(*actor),
            EventChange::UpdateDetails {
                starts_at,
                ends_at,
                location,
                attendees,
                notes,
            } => self.handle_update_details(
                *starts_at,
                *ends_at,
                location.as_deref(),
                *attendees,
                notes.as_deref(),
            ),
        }
    }

    fn handle_assign(&self, support_id: UserId, support_department: Department) -> DomainResult<Self> {
        if support_department != Department::Support {
            return Err(DomainError::validation(
                "assignee must be a member of the support team",
            ));
        }
        match self.status {
            // Unassigned → Assigned, or Assigned → Assigned (reassignment).
            EventStatus::Unassigned | EventStatus::Assigned => {
                let mut next = self.clone();
                next.status = EventStatus::Assigned;
                next.support_contact_id = Some(support_id);
                Ok(next)
            }
            EventStatus::Completed => Err(DomainError::illegal_transition(
                "completed events cannot be reassigned",
            )),
        }
    }

    fn handle_complete(&self, actor: UserId) -> DomainResult<Self> {
        match self.status {
            EventStatus::Unassigned => Err(DomainError::illegal_transition(
                "only assigned events can be completed",
            )),
            EventStatus::Assigned => {
                if self.support_contact_id != Some(actor) {
                    return Err(DomainError::insufficient_permission(
                        "only the assigned support contact may complete the event",
                    ));
                }
                let mut next = self.clone();
                next.status = EventStatus::Completed;
                Ok(next)
            }
            EventStatus::Completed => {
                if self.support_contact_id != Some(actor) {
                    return Err(DomainError::insufficient_permission(
                        "only the assigned support contact may complete the event",
                    ));
                }
                // Already completed by this contact: no-op success.
                Ok(self.clone())
            }
        }
    }

    fn handle_update_details(
        &self,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
        location: Option<&str>,
        attendees: Option<u32>,
        notes: Option<&str>,
    ) -> DomainResult<Self> {
        if self.status == EventStatus::Completed {
            return Err(DomainError::illegal_transition(
                "completed events can no longer be updated",
            ));
        }

        let next_start = starts_at.unwrap_or(self.starts_at);
        let next_end = ends_at.unwrap_or(self.ends_at);
        validate_schedule(next_start, next_end)?;

        let mut next = self.clone();
        next.starts_at = next_start;
        next.ends_at = next_end;
        if let Some(location) = location {
            if location.trim().is_empty() {
                return Err(DomainError::validation("location cannot be empty"));
            }
            next.location = location.trim().to_string();
        }
        if let Some(attendees) = attendees {
            validate_attendees(attendees)?;
            next.attendees = attendees;
        }
        if let Some(notes) = notes {
            next.notes = Some(notes.to_string());
        }
        Ok(next)
    }
}

fn validate_schedule(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> DomainResult<()> {
    if ends_at <= starts_at {
        return Err(DomainError::validation(
            "the end date must be after the start date",
        ));
    }
    Ok(())
}

fn validate_attendees(attendees: u32) -> DomainResult<()> {
    if attendees < 1 {
        return Err(DomainError::validation("attendees must be at least 1"));
    }
    Ok(())
}
