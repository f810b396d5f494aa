use rolegate_core::{AppError, ClientContext};

use super::*;

use crate::assume_role_ports::AssumeRoleRequest;

impl AssumeRoleService {
    /// Issues temporary credentials for the caller if the tracker permits it.
    ///
    /// The check and the recording happen in one atomic store operation before the
    /// provider is called, so concurrent requests cannot both pass the check even
    /// across processes sharing the store. Requests within this process also wait
    /// on a per-role, per-principal lock. A provider failure releases the
    /// reservation and leaves the permit in place.
    pub async fn issue_session(
        &self,
        client: &ClientContext,
        role_arn: &str,
        duration_seconds: Option<u32>,
    ) -> AppResult<IssuedSession> {
        let principal_arn = self.identity_provider.resolve_principal(client).await?;
        let role = self.tracker.require_role(role_arn).await?;
        let duration_seconds = role.resolve_duration(duration_seconds)?;

        let _guard = self
            .issuance_locks
            .acquire(role_arn, principal_arn.as_str())
            .await;

        let session = self
            .tracker
            .reserve_issuance(role_arn, principal_arn.as_str(), duration_seconds)
            .await?;

        let credentials = match self
            .identity_provider
            .assume_role(
                client,
                AssumeRoleRequest {
                    role_arn: role_arn.to_owned(),
                    session_name: self.session_name.clone(),
                    duration_seconds,
                },
            )
            .await
        {
            Ok(credentials) => credentials,
            Err(error) => {
                self.tracker
                    .release_issuance(role_arn, &session)
                    .await
                    .map_err(|release_error| {
                        AppError::Internal(format!(
                            "{error}; failed to release reserved session: {release_error}"
                        ))
                    })?;
                return Err(error);
            }
        };

        Ok(IssuedSession {
            role_arn: role_arn.to_owned(),
            principal_arn,
            credentials,
            session,
        })
    }
}
