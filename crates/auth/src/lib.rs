//! `eventcrm-auth` — identity boundary for the CRM core.
//!
//! This crate is intentionally decoupled from credential storage and
//! transport: password hashing and token signing live with the external
//! authentication collaborator. What crosses into the core is an
//! [`Identity`] value, derived from validated session claims.

pub mod claims;
pub mod department;
pub mod identity;
pub mod user;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use department::Department;
pub use identity::Identity;
pub use user::{NewUser, User, UserChange};
