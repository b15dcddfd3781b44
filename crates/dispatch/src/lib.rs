//! `eventcrm-dispatch` — orchestration around the policy engine.
//!
//! The [`Dispatcher`] is the single choke point through which every mutating
//! action passes: fetch current state, ask the permission policy, ask the
//! lifecycle policy, commit. No other code path writes an entity.

pub mod config;
pub mod dispatcher;
pub mod queries;
pub mod store;

pub use config::DispatchConfig;
pub use dispatcher::{ClientDetailsPatch, ClientDraft, ContractDraft, Dispatcher, EventDetailsPatch};
pub use store::{CrmStore, EntityRef, EntityState, InMemoryStore, StoreError};
