use rolegate_core::{AppError, ClientContext};

use super::*;

impl AssumeRoleService {
    /// Upserts every role the identity provider reports for the caller.
    ///
    /// Provider roles failing validation are skipped; storage failures abort the
    /// run and are returned.
    pub async fn sync_roles(&self, client: &ClientContext) -> AppResult<RoleSyncSummary> {
        let provider_roles = self.identity_provider.list_roles(client).await?;
        let mut summary = RoleSyncSummary {
            synchronized: 0,
            skipped: 0,
        };

        for role in provider_roles {
            match self.repository.upsert_provider_role(role).await {
                Ok(_) => summary.synchronized += 1,
                Err(AppError::Validation(_)) => summary.skipped += 1,
                Err(error) => return Err(error),
            }
        }

        Ok(summary)
    }
}
