use serde::{Deserialize, Serialize};

use eventcrm_domain::{Client, Contract, Event};

/// The persisted business object an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Client,
    Contract,
    Event,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Client => "client",
            EntityKind::Contract => "contract",
            EntityKind::Event => "event",
        }
    }
}

/// An action an identity attempts against an entity.
///
/// A closed set per entity type. Variants borrow the current entity state
/// so ownership rules can inspect it; `Create` variants carry only what the
/// rules need (the owning client or contract), since the target does not
/// exist yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action<'a> {
    /// Read any single entity or listing. Globally allowed.
    Read(EntityKind),

    CreateUser,
    UpdateUser,
    DeleteUser,

    CreateClient,
    UpdateClient { client: &'a Client },
    ReassignClient { client: &'a Client },

    CreateContract { client: &'a Client },
    UpdateContract { contract: &'a Contract },

    CreateEvent { contract: &'a Contract },
    UpdateEvent { event: &'a Event },
    CompleteEvent { event: &'a Event },
    AssignSupport { event: &'a Event },

    /// Scoped listing of events awaiting assignment.
    FilterUnassignedEvents,
    /// Scoped listing of a commercial's own unsigned contracts.
    FilterOwnUnsignedContracts,
    /// Scoped listing of a commercial's own contracts with money still due.
    FilterOwnUnpaidContracts,
    /// Scoped listing of a support collaborator's own assignments.
    FilterOwnEvents,
}

impl Action<'_> {
    /// Short identifier used in deny reasons and logs.
    pub fn describe(&self) -> &'static str {
        match self {
            Action::Read(EntityKind::User) => "user.read",
            Action::Read(EntityKind::Client) => "client.read",
            Action::Read(EntityKind::Contract) => "contract.read",
            Action::Read(EntityKind::Event) => "event.read",
            Action::CreateUser => "user.create",
            Action::UpdateUser => "user.update",
            Action::DeleteUser => "user.delete",
            Action::CreateClient => "client.create",
            Action::UpdateClient { .. } => "client.update",
            Action::ReassignClient { .. } => "client.reassign",
            Action::CreateContract { .. } => "contract.create",
            Action::UpdateContract { .. } => "contract.update",
            Action::CreateEvent { .. } => "event.create",
            Action::UpdateEvent { .. } => "event.update",
            Action::CompleteEvent { .. } => "event.complete",
            Action::AssignSupport { .. } => "event.assign_support",
            Action::FilterUnassignedEvents => "event.filter_unassigned",
            Action::FilterOwnUnsignedContracts => "contract.filter_own_unsigned",
            Action::FilterOwnUnpaidContracts => "contract.filter_own_unpaid",
            Action::FilterOwnEvents => "event.filter_own",
        }
    }
}
