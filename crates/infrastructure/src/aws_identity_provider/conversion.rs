use chrono::{DateTime, Utc};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{DEFAULT_MAX_SESSION_DURATION, ProviderRole, trust_policy_principals};

pub(super) fn smithy_to_utc(seconds: i64, subsec_nanos: u32) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, subsec_nanos).ok_or_else(|| {
        AppError::IdentityProvider(format!("provider timestamp '{seconds}' is out of range"))
    })
}

/// Builds a provider role from IAM attributes.
///
/// The trust policy arrives URL-encoded. A missing document trusts nobody; a
/// missing session bound falls back to the provider default.
pub(super) fn provider_role(
    role_name: &str,
    role_arn: &str,
    create_date: DateTime<Utc>,
    max_session_duration: Option<i32>,
    policy_document: Option<&str>,
) -> AppResult<ProviderRole> {
    let principal = match policy_document {
        Some(encoded) => {
            let decoded = urlencoding::decode(encoded).map_err(|error| {
                AppError::Validation(format!(
                    "trust policy for '{role_arn}' is not valid UTF-8: {error}"
                ))
            })?;
            trust_policy_principals(&decoded)?
        }
        None => Vec::new(),
    };

    let max_session_duration = match max_session_duration {
        Some(seconds) => u32::try_from(seconds).map_err(|_| {
            AppError::Validation(format!(
                "max_session_duration for '{role_arn}' must not be negative"
            ))
        })?,
        None => DEFAULT_MAX_SESSION_DURATION,
    };

    ProviderRole {
        role_name: role_name.to_owned(),
        role_arn: role_arn.to_owned(),
        create_date,
        max_session_duration,
        principal,
    }
    .validated()
}
