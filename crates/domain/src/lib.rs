//! `eventcrm-domain` — Client, Contract and Event state plus their lifecycle
//! policy.
//!
//! Each entity exposes a closed change enum handled by a pure
//! `handle(&self, &Change) -> DomainResult<Self>` function: current state in,
//! next state out, no mutation, no IO. Transitions outside the table reject
//! with a typed reason; already-applied transitions are no-op successes.

pub mod client;
pub mod contract;
pub mod event;

pub use client::{Client, ClientChange, NewClient};
pub use contract::{Contract, ContractChange, NewContract};
pub use event::{Event, EventChange, EventStatus, NewEvent};
