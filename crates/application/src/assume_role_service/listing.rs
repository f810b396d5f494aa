use rolegate_core::ClientContext;

use super::*;

impl AssumeRoleService {
    /// Lists every stored role record.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleRecord>> {
        self.repository.list_roles().await
    }

    /// Lists roles whose trust policy admits the caller's principal.
    pub async fn roles_for_client(
        &self,
        client: &ClientContext,
    ) -> AppResult<(String, Vec<PrincipalRoleView>)> {
        let principal_arn = self.identity_provider.resolve_principal(client).await?;
        let roles = self.roles_for_principal(principal_arn.as_str()).await?;
        Ok((principal_arn, roles))
    }

    /// Lists roles whose trust policy admits the principal, with issuance state.
    pub async fn roles_for_principal(
        &self,
        principal_arn: &str,
    ) -> AppResult<Vec<PrincipalRoleView>> {
        let now = self.tracker.now();

        Ok(self
            .repository
            .list_roles()
            .await?
            .into_iter()
            .filter(|record| record.trusts(principal_arn))
            .map(|record| {
                let check = record.check_issuance(principal_arn, now);
                PrincipalRoleView { record, check }
            })
            .collect())
    }

    /// Lists roles that carry at least one permission flag.
    pub async fn permission_overview(&self) -> AppResult<Vec<RolePermissionOverview>> {
        let now = self.tracker.now();

        Ok(self
            .repository
            .list_roles()
            .await?
            .into_iter()
            .filter(|record| !record.tracking().assume_permission().is_empty())
            .map(|record| {
                let principals = record
                    .tracking()
                    .assume_permission()
                    .iter()
                    .map(|(principal_arn, permission)| PrincipalPermission {
                        principal_arn: principal_arn.clone(),
                        permission: *permission,
                        liveness: record.tracking().liveness(principal_arn, now),
                    })
                    .collect();

                RolePermissionOverview {
                    role_arn: record.role_arn().to_owned(),
                    role_name: record.role_name().to_owned(),
                    principals,
                }
            })
            .collect())
    }
}
