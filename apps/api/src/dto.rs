mod common;
mod roles;
mod sessions;

pub use common::{HealthDependencyStatus, HealthResponse};
pub use roles::{
    IssuanceCheckResponse, PrincipalRolesResponse, RolePermissionOverviewResponse,
    RoleRecordResponse, UpdatePermissionRequest,
};
pub use sessions::{
    ClientCredentialsRequest, IssueSessionRequest, IssuedSessionResponse, RoleSyncResponse,
};

#[cfg(test)]
mod tests {
    use super::roles::{AssumeSessionResponse, PrincipalPermissionResponse, PrincipalRoleResponse};
    use super::{
        ClientCredentialsRequest, HealthDependencyStatus, HealthResponse, IssuanceCheckResponse,
        IssueSessionRequest, IssuedSessionResponse, PrincipalRolesResponse,
        RolePermissionOverviewResponse, RoleRecordResponse, RoleSyncResponse,
        UpdatePermissionRequest,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        AssumeSessionResponse::export(&config)?;
        ClientCredentialsRequest::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthDependencyStatus::export(&config)?;
        HealthResponse::export(&config)?;
        IssuanceCheckResponse::export(&config)?;
        IssueSessionRequest::export(&config)?;
        IssuedSessionResponse::export(&config)?;
        PrincipalPermissionResponse::export(&config)?;
        PrincipalRoleResponse::export(&config)?;
        PrincipalRolesResponse::export(&config)?;
        RolePermissionOverviewResponse::export(&config)?;
        RoleRecordResponse::export(&config)?;
        RoleSyncResponse::export(&config)?;
        UpdatePermissionRequest::export(&config)?;

        Ok(())
    }
}
