//! Action execution pipeline (application-level orchestration).
//!
//! Every mutating action follows the same sequence:
//!
//! ```text
//! Action
//!   ↓
//! 1. Load current entity state from the store
//!   ↓
//! 2. Permission policy (`decide`) — stop on Deny
//!   ↓
//! 3. Lifecycle policy (pure `handle`/`create`) — stop on Reject
//!   ↓
//! 4. Commit the next state (optimistic version check)
//! ```
//!
//! The first failure is returned verbatim and nothing is partially applied.
//! Conflicting commits are re-fetched and re-decided a bounded number of
//! times before surfacing `ConcurrentModification`.

use chrono::{DateTime, Utc};

use eventcrm_auth::{Department, Identity, NewUser, User, UserChange};
use eventcrm_core::{
    ClientId, ContractId, DomainError, DomainResult, EventId, ExpectedVersion, UserId,
};
use eventcrm_domain::{
    Client, ClientChange, Contract, ContractChange, Event, EventChange, NewClient, NewContract,
    NewEvent,
};
use eventcrm_policy::{Action, decide};

use crate::config::DispatchConfig;
use crate::store::{CrmStore, EntityRef, EntityState};

/// Input for registering a client through the dispatcher.
///
/// Carries no owner for Commercial callers (they always own the clients they
/// create); Management must name the owning Commercial collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDraft {
    pub id: ClientId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: String,
    pub commercial_contact_id: Option<UserId>,
    pub occurred_at: DateTime<Utc>,
}

/// Input for drawing up a contract through the dispatcher.
///
/// The commercial contact is not an input: it is copied from the owning
/// client at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractDraft {
    pub id: ContractId,
    pub client_id: ClientId,
    pub total_amount: u64,
    pub amount_due: u64,
    pub signed: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Logistics fields a support contact may edit on an event.
///
/// Assignment and completion deliberately have their own operations with
/// their own permission actions; they cannot ride in through here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventDetailsPatch {
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub attendees: Option<u32>,
    pub notes: Option<String>,
}

/// Detail fields a commercial contact may edit on a client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientDetailsPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
}

/// The single choke point through which every mutating action passes.
#[derive(Debug)]
pub struct Dispatcher<S> {
    store: S,
    config: DispatchConfig,
}

impl<S> Dispatcher<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: DispatchConfig::default(),
        }
    }

    pub fn with_config(store: S, config: DispatchConfig) -> Self {
        Self { store, config }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: CrmStore> Dispatcher<S> {
    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_user(&self, identity: &Identity, new: NewUser) -> DomainResult<User> {
        let result: DomainResult<User> = (|| {
            decide(identity, &Action::CreateUser).into_result()?;
            let user = User::create(new)?;
            self.store.insert(EntityState::User(user.clone()))?;
            Ok(user)
        })();
        traced("user.create", result)
    }

    pub fn update_user(
        &self,
        identity: &Identity,
        id: UserId,
        change: UserChange,
    ) -> DomainResult<User> {
        traced(
            "user.update",
            self.retry_on_conflict(|| {
                let user = self.load_user(id)?;
                decide(identity, &Action::UpdateUser).into_result()?;
                let next = user.handle(&change)?;
                self.store.commit(
                    EntityState::User(next.clone()),
                    ExpectedVersion::Exact(user.version),
                )?;
                Ok(next)
            }),
        )
    }

    pub fn delete_user(&self, identity: &Identity, id: UserId) -> DomainResult<()> {
        let result: DomainResult<()> = (|| {
            decide(identity, &Action::DeleteUser).into_result()?;
            self.store.remove(EntityRef::User(id))?;
            Ok(())
        })();
        traced("user.delete", result)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Clients
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_client(&self, identity: &Identity, draft: ClientDraft) -> DomainResult<Client> {
        let result: DomainResult<Client> = (|| {
            decide(identity, &Action::CreateClient).into_result()?;

            let commercial_contact_id = match identity.department {
                Department::Commercial => match draft.commercial_contact_id {
                    // Commercial creators always own their clients.
                    None => identity.user_id,
                    Some(owner) if owner == identity.user_id => owner,
                    Some(_) => {
                        return Err(DomainError::validation(
                            "commercial collaborators own the clients they create",
                        ));
                    }
                },
                _ => {
                    let owner = draft.commercial_contact_id.ok_or_else(|| {
                        DomainError::validation("a commercial contact is required")
                    })?;
                    self.ensure_department(owner, Department::Commercial)?;
                    owner
                }
            };

            let client = Client::create(NewClient {
                id: draft.id,
                full_name: draft.full_name,
                email: draft.email,
                phone: draft.phone,
                company_name: draft.company_name,
                commercial_contact_id,
                occurred_at: draft.occurred_at,
            })?;
            self.store.insert(EntityState::Client(client.clone()))?;
            Ok(client)
        })();
        traced("client.create", result)
    }

    pub fn update_client(
        &self,
        identity: &Identity,
        id: ClientId,
        patch: ClientDetailsPatch,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Client> {
        traced(
            "client.update",
            self.retry_on_conflict(|| {
                let client = self.load_client(id)?;
                decide(identity, &Action::UpdateClient { client: &client }).into_result()?;
                let next = client.handle(&ClientChange::UpdateDetails {
                    full_name: patch.full_name.clone(),
                    email: patch.email.clone(),
                    phone: patch.phone.clone(),
                    company_name: patch.company_name.clone(),
                    occurred_at,
                })?;
                self.store.commit(
                    EntityState::Client(next.clone()),
                    ExpectedVersion::Exact(client.version),
                )?;
                Ok(next)
            }),
        )
    }

    pub fn reassign_client(
        &self,
        identity: &Identity,
        id: ClientId,
        new_commercial_id: UserId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Client> {
        traced(
            "client.reassign",
            self.retry_on_conflict(|| {
                let client = self.load_client(id)?;
                decide(identity, &Action::ReassignClient { client: &client }).into_result()?;
                let new_owner = self.load_user(new_commercial_id)?;
                let next = client.handle(&ClientChange::ReassignCommercial {
                    new_commercial_id,
                    new_commercial_department: new_owner.department,
                    occurred_at,
                })?;
                self.store.commit(
                    EntityState::Client(next.clone()),
                    ExpectedVersion::Exact(client.version),
                )?;
                Ok(next)
            }),
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Contracts
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_contract(
        &self,
        identity: &Identity,
        draft: ContractDraft,
    ) -> DomainResult<Contract> {
        let result: DomainResult<Contract> = (|| {
            let client = self.load_client(draft.client_id)?;
            decide(identity, &Action::CreateContract { client: &client }).into_result()?;

            let contract = Contract::create(NewContract {
                id: draft.id,
                client_id: client.id,
                commercial_contact_id: client.commercial_contact_id,
                total_amount: draft.total_amount,
                amount_due: draft.amount_due,
                signed: draft.signed,
                occurred_at: draft.occurred_at,
            })?;
            self.store.insert(EntityState::Contract(contract.clone()))?;
            Ok(contract)
        })();
        traced("contract.create", result)
    }

    pub fn update_contract(
        &self,
        identity: &Identity,
        id: ContractId,
        change: ContractChange,
    ) -> DomainResult<Contract> {
        traced(
            "contract.update",
            self.retry_on_conflict(|| {
                let contract = self.load_contract(id)?;
                decide(identity, &Action::UpdateContract {
                    contract: &contract,
                })
                .into_result()?;
                let next = contract.handle(&change)?;
                self.store.commit(
                    EntityState::Contract(next.clone()),
                    ExpectedVersion::Exact(contract.version),
                )?;
                Ok(next)
            }),
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_event(&self, identity: &Identity, new: NewEvent) -> DomainResult<Event> {
        let result: DomainResult<Event> = (|| {
            let contract = self.load_contract(new.contract_id)?;
            decide(identity, &Action::CreateEvent {
                contract: &contract,
            })
            .into_result()?;

            // Second, independent gate: the lifecycle re-checks the signed
            // flag even though the permission rule already looked at it.
            let event = Event::create(new, &contract)?;
            self.store.insert(EntityState::Event(event.clone()))?;
            Ok(event)
        })();
        traced("event.create", result)
    }

    pub fn update_event(
        &self,
        identity: &Identity,
        id: EventId,
        patch: EventDetailsPatch,
    ) -> DomainResult<Event> {
        traced(
            "event.update",
            self.retry_on_conflict(|| {
                let event = self.load_event(id)?;
                decide(identity, &Action::UpdateEvent { event: &event }).into_result()?;
                let next = event.handle(&EventChange::UpdateDetails {
                    starts_at: patch.starts_at,
                    ends_at: patch.ends_at,
                    location: patch.location.clone(),
                    attendees: patch.attendees,
                    notes: patch.notes.clone(),
                })?;
                self.store.commit(
                    EntityState::Event(next.clone()),
                    ExpectedVersion::Exact(event.version),
                )?;
                Ok(next)
            }),
        )
    }

    pub fn assign_support(
        &self,
        identity: &Identity,
        id: EventId,
        support_id: UserId,
    ) -> DomainResult<Event> {
        traced(
            "event.assign_support",
            self.retry_on_conflict(|| {
                let event = self.load_event(id)?;
                decide(identity, &Action::AssignSupport { event: &event }).into_result()?;
                let assignee = self.load_user(support_id)?;
                let next = event.handle(&EventChange::AssignSupport {
                    support_id,
                    support_department: assignee.department,
                })?;
                self.store.commit(
                    EntityState::Event(next.clone()),
                    ExpectedVersion::Exact(event.version),
                )?;
                Ok(next)
            }),
        )
    }

    pub fn complete_event(&self, identity: &Identity, id: EventId) -> DomainResult<Event> {
        traced(
            "event.complete",
            self.retry_on_conflict(|| {
                let event = self.load_event(id)?;
                decide(identity, &Action::CompleteEvent { event: &event }).into_result()?;
                let next = event.handle(&EventChange::Complete {
                    actor: identity.user_id,
                })?;
                self.store.commit(
                    EntityState::Event(next.clone()),
                    ExpectedVersion::Exact(event.version),
                )?;
                Ok(next)
            }),
        )
    }

    // ─────────────────────────────────────────────────────────────────────
    // Shared plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn retry_on_conflict<T>(&self, mut attempt: impl FnMut() -> DomainResult<T>) -> DomainResult<T> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(DomainError::ConcurrentModification)
                    if retries < self.config.max_conflict_retries =>
                {
                    retries += 1;
                }
                other => return other,
            }
        }
    }

    fn ensure_department(&self, id: UserId, department: Department) -> DomainResult<()> {
        let user = self.load_user(id)?;
        if user.department != department {
            return Err(DomainError::validation(format!(
                "user {id} is not a member of the {department} department"
            )));
        }
        Ok(())
    }

    pub(crate) fn load_user(&self, id: UserId) -> DomainResult<User> {
        match self.store.load(EntityRef::User(id))? {
            EntityState::User(user) => Ok(user),
            other => Err(shape_mismatch("user", other.entity_ref())),
        }
    }

    pub(crate) fn load_client(&self, id: ClientId) -> DomainResult<Client> {
        match self.store.load(EntityRef::Client(id))? {
            EntityState::Client(client) => Ok(client),
            other => Err(shape_mismatch("client", other.entity_ref())),
        }
    }

    pub(crate) fn load_contract(&self, id: ContractId) -> DomainResult<Contract> {
        match self.store.load(EntityRef::Contract(id))? {
            EntityState::Contract(contract) => Ok(contract),
            other => Err(shape_mismatch("contract", other.entity_ref())),
        }
    }

    pub(crate) fn load_event(&self, id: EventId) -> DomainResult<Event> {
        match self.store.load(EntityRef::Event(id))? {
            EntityState::Event(event) => Ok(event),
            other => Err(shape_mismatch("event", other.entity_ref())),
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}

// Enforce entity shape even if a buggy backend returns the wrong state kind.
fn shape_mismatch(expected: &str, got: EntityRef) -> DomainError {
    DomainError::unknown_entity(format!("expected a {expected}, store returned {got}"))
}

fn traced<T>(action: &'static str, result: DomainResult<T>) -> DomainResult<T> {
    match &result {
        Ok(_) => tracing::info!(action, "committed"),
        Err(err) => tracing::warn!(action, error = %err, "refused"),
    }
    result
}
