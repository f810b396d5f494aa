use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{AppError, AppResult, NonEmptyString};

/// Region used when the caller does not supply one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Long-lived caller credentials and endpoint for one identity provider call chain.
///
/// Built per request from caller input and passed explicitly to every provider
/// call. Never persisted.
#[derive(Debug)]
pub struct ClientContext {
    access_key: NonEmptyString,
    secret_key: SecretString,
    endpoint: Url,
    region: String,
}

impl ClientContext {
    /// Creates a validated client context.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        endpoint: &str,
        region: Option<&str>,
    ) -> AppResult<Self> {
        let access_key = NonEmptyString::new(access_key)
            .map_err(|_| AppError::Validation("access_key must not be empty".to_owned()))?;

        let secret_key = secret_key.into();
        if secret_key.trim().is_empty() {
            return Err(AppError::Validation(
                "secret_key must not be empty".to_owned(),
            ));
        }

        let endpoint = Url::parse(endpoint.trim())
            .map_err(|error| AppError::Validation(format!("invalid endpoint '{endpoint}': {error}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "endpoint scheme must be http or https, got '{}'",
                endpoint.scheme()
            )));
        }

        let region = region
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_REGION)
            .to_owned();

        Ok(Self {
            access_key,
            secret_key: SecretString::new(secret_key),
            endpoint,
            region,
        })
    }

    /// Returns the caller access key id.
    #[must_use]
    pub fn access_key(&self) -> &str {
        self.access_key.as_str()
    }

    /// Returns the caller secret key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// Returns the provider endpoint without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    /// Returns the signing region.
    #[must_use]
    pub fn region(&self) -> &str {
        self.region.as_str()
    }
}
