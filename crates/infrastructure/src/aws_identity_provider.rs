use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use tracing::{info, warn};

use rolegate_application::{AssumeRoleRequest, IdentityProvider, IssuedCredentials};
use rolegate_core::{AppError, AppResult, ClientContext};
use rolegate_domain::ProviderRole;

mod conversion;


use conversion::{provider_role, smithy_to_utc};

const CREDENTIALS_PROVIDER_NAME: &str = "rolegate";

/// IAM/STS-compatible identity provider backed by the AWS SDK.
///
/// Every call is signed with the caller's own long-lived keys against the
/// endpoint carried by the [`ClientContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsIdentityProvider;

impl AwsIdentityProvider {
    /// Creates a provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn sdk_config(&self, client: &ClientContext) -> SdkConfig {
        let credentials = Credentials::new(
            client.access_key(),
            client.secret_key(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(client.region().to_owned()))
            .endpoint_url(client.endpoint())
            .credentials_provider(credentials)
            .load()
            .await
    }
}

#[async_trait]
impl IdentityProvider for AwsIdentityProvider {
    async fn resolve_principal(&self, client: &ClientContext) -> AppResult<String> {
        let iam = aws_sdk_iam::Client::new(&self.sdk_config(client).await);

        let output = iam.get_user().send().await.map_err(|error| {
            AppError::IdentityProvider(format!(
                "failed to resolve caller: {}",
                aws_sdk_iam::error::DisplayErrorContext(&error)
            ))
        })?;

        output
            .user()
            .map(|user| user.arn().to_owned())
            .ok_or_else(|| AppError::IdentityProvider("caller identity has no user".to_owned()))
    }

    async fn assume_role(
        &self,
        client: &ClientContext,
        request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials> {
        let sts = aws_sdk_sts::Client::new(&self.sdk_config(client).await);
        let duration_seconds = i32::try_from(request.duration_seconds).map_err(|_| {
            AppError::Validation("duration_seconds exceeds supported range".to_owned())
        })?;

        let output = sts
            .assume_role()
            .role_arn(request.role_arn.as_str())
            .role_session_name(request.session_name.as_str())
            .duration_seconds(duration_seconds)
            .send()
            .await
            .map_err(|error| {
                AppError::IdentityProvider(format!(
                    "failed to assume role '{}': {}",
                    request.role_arn,
                    aws_sdk_sts::error::DisplayErrorContext(&error)
                ))
            })?;

        let credentials = output.credentials().ok_or_else(|| {
            AppError::IdentityProvider(format!(
                "assume role '{}' returned no credentials",
                request.role_arn
            ))
        })?;
        let expiration = credentials.expiration();

        info!(
            role_arn = %request.role_arn,
            session_name = %request.session_name,
            duration_seconds = request.duration_seconds,
            "issued temporary credentials"
        );

        Ok(IssuedCredentials {
            access_key_id: credentials.access_key_id().to_owned(),
            secret_access_key: credentials.secret_access_key().to_owned(),
            session_token: credentials.session_token().to_owned(),
            expires_at: smithy_to_utc(expiration.secs(), expiration.subsec_nanos())?,
        })
    }

    async fn list_roles(&self, client: &ClientContext) -> AppResult<Vec<ProviderRole>> {
        let iam = aws_sdk_iam::Client::new(&self.sdk_config(client).await);
        let mut roles = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = iam
                .list_roles()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|error| {
                    AppError::IdentityProvider(format!(
                        "failed to list roles: {}",
                        aws_sdk_iam::error::DisplayErrorContext(&error)
                    ))
                })?;

            for role in page.roles() {
                let create_date = role.create_date();
                let converted = provider_role(
                    role.role_name(),
                    role.arn(),
                    smithy_to_utc(create_date.secs(), create_date.subsec_nanos())?,
                    role.max_session_duration(),
                    role.assume_role_policy_document(),
                );

                match converted {
                    Ok(converted) => roles.push(converted),
                    Err(error) => {
                        warn!(role_arn = %role.arn(), error = %error, "skipping provider role");
                    }
                }
            }

            match (page.is_truncated(), page.marker()) {
                (true, Some(next)) => marker = Some(next.to_owned()),
                _ => break,
            }
        }

        Ok(roles)
    }
}
