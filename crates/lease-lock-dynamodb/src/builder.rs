//! DynamoDB store builder.

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::Credentials;
use lease_lock_core::clock::{Clock, SystemClock};
use lease_lock_core::error::{LockError, LockResult};
use lease_lock_core::store::LeaseStore;

use crate::store::DynamoLeaseStore;

/// Builder for [`DynamoLeaseStore`] configuration.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> lease_lock_core::LockResult<()> {
/// let store = lease_lock_dynamodb::DynamoLeaseStore::builder()
///     .table_name("leases")
///     .region("us-east-1")
///     .credentials("AKID...", "secret...")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct DynamoLeaseStoreBuilder {
    table_name: Option<String>,
    region: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    endpoint_url: Option<String>,
    client: Option<Client>,
    provision_table: bool,
    clock: Arc<dyn Clock>,
}

impl DynamoLeaseStoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            table_name: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
            endpoint_url: None,
            client: None,
            provision_table: true,
            clock: Arc::new(SystemClock),
        }
    }

    /// Sets the table holding lease rows. Required.
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    /// Overrides the SDK's default region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Uses static credentials instead of the SDK's default provider chain.
    pub fn credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Overrides the service endpoint (e.g. DynamoDB Local, LocalStack).
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Uses an existing DynamoDB client, skipping config loading.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Whether `build` provisions the table (default `true`).
    pub fn provision_table(mut self, provision: bool) -> Self {
        self.provision_table = provision;
        self
    }

    /// Overrides the clock used to compute lease expiry.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the store.
    ///
    /// Provisioning failure is downgraded to a warning: later operations
    /// still fail clearly if the table truly is missing, and the table may
    /// already exist with the right layout.
    pub async fn build(self) -> LockResult<DynamoLeaseStore> {
        let table_name = self
            .table_name
            .ok_or_else(|| LockError::InvalidName("table name not specified".to_string()))?;

        let client = match self.client {
            Some(client) => client,
            None => {
                let mut loader = aws_config::defaults(BehaviorVersion::latest());
                if let Some(region) = self.region {
                    loader = loader.region(Region::new(region));
                }
                if let (Some(id), Some(secret)) = (self.access_key_id, self.secret_access_key) {
                    loader =
                        loader.credentials_provider(Credentials::new(id, secret, None, None, "lease-lock"));
                }
                let sdk_config = loader.load().await;

                let mut config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
                if let Some(endpoint) = self.endpoint_url {
                    config = config.endpoint_url(endpoint);
                }
                Client::from_conf(config.build())
            }
        };

        let store = DynamoLeaseStore::with_clock(client, table_name, self.clock);

        if self.provision_table
            && let Err(err) = store.ensure_schema().await
        {
            tracing::warn!(
                table = %store.table_name(),
                error = %err,
                "lease table provisioning failed; operations will fail if the table is missing"
            );
        }

        Ok(store)
    }
}

impl Default for DynamoLeaseStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_requires_table_name() {
        let err = DynamoLeaseStoreBuilder::new().build().await.unwrap_err();
        assert!(matches!(err, LockError::InvalidName(_)));
    }

    #[tokio::test]
    async fn build_with_client_skips_config_loading() {
        let config = aws_sdk_dynamodb::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .build();
        let client = Client::from_conf(config);

        let store = DynamoLeaseStore::builder()
            .table_name("leases")
            .client(client)
            .provision_table(false)
            .build()
            .await
            .unwrap();
        assert_eq!(store.table_name(), "leases");
    }
}
