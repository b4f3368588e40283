//! Secret store capability.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use aws_types::SdkConfig;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Credential provider keyed by secret name.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the string value of a secret.
    async fn secret_string(&self, name: &str) -> StorageResult<String>;
}

/// AWS Secrets Manager client.
#[derive(Clone)]
pub struct SecretsManagerClient {
    client: Client,
}

impl SecretsManagerClient {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerClient {
    async fn secret_string(&self, name: &str) -> StorageResult<String> {
        debug!("Fetching secret {}", name);

        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                if e
                    .as_service_error()
                    .map(|se| se.is_resource_not_found_exception())
                    .unwrap_or(false)
                {
                    StorageError::SecretNotFound(name.to_string())
                } else {
                    StorageError::secret_failed(DisplayErrorContext(&e).to_string())
                }
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| StorageError::secret_failed(format!("secret {} has no string value", name)))
    }
}

/// In-process secret store.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<String, String>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn secret_string(&self, name: &str) -> StorageResult<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::SecretNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_secret_lookup() {
        let store = MemorySecretStore::new().with_secret("prod/creds", "{}");
        assert_eq!(store.secret_string("prod/creds").await.unwrap(), "{}");

        let err = store.secret_string("other").await.unwrap_err();
        assert!(matches!(err, StorageError::SecretNotFound(_)));
    }
}
