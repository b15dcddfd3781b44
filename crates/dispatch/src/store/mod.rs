//! Core-facing contract with the persistence collaborator.
//!
//! The core owns no schema, transactions or wire format; it loads current
//! entity state, decides, and commits the next state. Optimistic versioning
//! is the store's concurrency discipline: a commit names the version it
//! decided against, and a mismatch is a [`StoreError::Conflict`] the
//! dispatcher may retry.

pub mod memory;

pub use memory::InMemoryStore;

use thiserror::Error;

use eventcrm_auth::User;
use eventcrm_core::{ClientId, ContractId, DomainError, EventId, ExpectedVersion, UserId};
use eventcrm_domain::{Client, Contract, Event};

/// Reference to a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    User(UserId),
    Client(ClientId),
    Contract(ContractId),
    Event(EventId),
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityRef::User(id) => write!(f, "user {id}"),
            EntityRef::Client(id) => write!(f, "client {id}"),
            EntityRef::Contract(id) => write!(f, "contract {id}"),
            EntityRef::Event(id) => write!(f, "event {id}"),
        }
    }
}

/// Current state of a persisted entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityState {
    User(User),
    Client(Client),
    Contract(Contract),
    Event(Event),
}

impl EntityState {
    pub fn entity_ref(&self) -> EntityRef {
        match self {
            EntityState::User(user) => EntityRef::User(user.id),
            EntityState::Client(client) => EntityRef::Client(client.id),
            EntityState::Contract(contract) => EntityRef::Contract(contract.id),
            EntityState::Event(event) => EntityRef::Event(event.id),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            EntityState::User(user) => user.version,
            EntityState::Client(client) => client.version,
            EntityState::Contract(contract) => contract.version,
            EntityState::Event(event) => event.version,
        }
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        match self {
            EntityState::User(user) => user.version = version,
            EntityState::Client(client) => client.version = version,
            EntityState::Contract(contract) => contract.version = version,
            EntityState::Event(event) => event.version = version,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency failure (e.g. stale entity version).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced entity does not exist.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(_) => DomainError::ConcurrentModification,
            StoreError::UnknownEntity(msg) => DomainError::UnknownEntity(msg),
        }
    }
}

/// Persistence collaborator contract.
///
/// Implementations must provide at least read-committed isolation; the
/// dispatcher relies on version-checked commits to detect lost updates.
pub trait CrmStore {
    /// Load the current state of an entity.
    fn load(&self, entity: EntityRef) -> Result<EntityState, StoreError>;

    /// Durably commit a new entity state.
    ///
    /// `expected` is the version the caller decided against. The store
    /// rejects the commit with [`StoreError::Conflict`] if the persisted
    /// version moved in the meantime, and assigns the committed state the
    /// next version.
    fn commit(&self, state: EntityState, expected: ExpectedVersion) -> Result<(), StoreError>;

    /// Insert a brand-new entity. Fails with [`StoreError::Conflict`] if the
    /// id is already taken.
    fn insert(&self, state: EntityState) -> Result<(), StoreError>;

    /// Hard-delete an entity (only ever used for users).
    fn remove(&self, entity: EntityRef) -> Result<(), StoreError>;

    fn list_users(&self) -> Vec<User>;
    fn list_clients(&self) -> Vec<Client>;
    fn list_contracts(&self) -> Vec<Contract>;
    fn list_events(&self) -> Vec<Event>;
}
