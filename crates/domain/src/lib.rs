//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assume;
mod role;
mod trust_policy;

pub use assume::{
    AssumePermission, AssumeSession, AssumeTracking, IssuanceCheck, IssuanceDenial,
    SessionLiveness,
};
pub use role::{DEFAULT_MAX_SESSION_DURATION, ProviderRole, RoleRecord};
pub use trust_policy::trust_policy_principals;
