//! Application services and ports.

#![forbid(unsafe_code)]

mod assume_role_ports;
mod assume_role_service;
mod authorization_tracker;

#[cfg(test)]
mod test_support;

pub use assume_role_ports::{
    AssumeRoleRequest, Clock, IdentityProvider, IssuedCredentials, RoleRecordRepository,
    SystemClock,
};
pub use assume_role_service::{
    AssumeRoleService, DEFAULT_SESSION_NAME, IssuedSession, PrincipalPermission,
    PrincipalRoleView, RolePermissionOverview, RoleSyncSummary,
};
pub use authorization_tracker::AuthorizationTracker;
