//! `eventcrm-policy` — the permission decision engine.
//!
//! One ordered rule table, evaluated by one pure function. Every role check
//! in the system lives here; controllers and the dispatcher never compare
//! departments themselves.

pub mod action;
pub mod decision;
pub mod rules;

pub use action::{Action, EntityKind};
pub use decision::Decision;
pub use rules::decide;
