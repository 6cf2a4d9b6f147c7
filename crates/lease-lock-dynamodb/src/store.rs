//! DynamoDB lease store implementation.

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use lease_lock_core::clock::{Clock, SystemClock};
use lease_lock_core::error::{LockError, LockResult};
use lease_lock_core::store::LeaseStore;
use tracing::{Span, instrument};

use crate::builder::DynamoLeaseStoreBuilder;
use crate::classify::{
    classify_sdk_error, is_delete_conditional_check_failed, is_put_conditional_check_failed,
};
use crate::schema::{
    ACQUIRE_CONDITION, ATTR_EXPIRES_AT, ATTR_OWNER, ATTR_RESOURCE, RELEASE_CONDITION,
};

/// [`LeaseStore`] backed by a DynamoDB table.
pub struct DynamoLeaseStore {
    client: Client,
    table_name: String,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DynamoLeaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoLeaseStore")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}

impl DynamoLeaseStore {
    /// Creates a store from an existing client.
    ///
    /// Does not provision the table; call
    /// [`ensure_schema`](LeaseStore::ensure_schema) or use the builder.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Returns a builder for endpoint/credential/table configuration.
    pub fn builder() -> DynamoLeaseStoreBuilder {
        DynamoLeaseStoreBuilder::new()
    }

    pub(crate) fn with_clock(client: Client, table_name: String, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            table_name,
            clock,
        }
    }

    /// The backing table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table_exists(&self) -> LockResult<bool> {
        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(
                    service_err.err(),
                    DescribeTableError::ResourceNotFoundException(_)
                ) =>
            {
                Ok(false)
            }
            Err(err) => Err(LockError::Schema(Box::new(err))),
        }
    }

    async fn create_table(&self) -> LockResult<()> {
        let key_attribute = AttributeDefinition::builder()
            .attribute_name(ATTR_RESOURCE)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| LockError::Schema(Box::new(e)))?;
        let key_schema = KeySchemaElement::builder()
            .attribute_name(ATTR_RESOURCE)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| LockError::Schema(Box::new(e)))?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(1)
            .write_capacity_units(1)
            .build()
            .map_err(|e| LockError::Schema(Box::new(e)))?;

        match self
            .client
            .create_table()
            .table_name(&self.table_name)
            .attribute_definitions(key_attribute)
            .key_schema(key_schema)
            .provisioned_throughput(throughput)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            // Lost a provisioning race with another process.
            Err(SdkError::ServiceError(service_err))
                if matches!(
                    service_err.err(),
                    CreateTableError::ResourceInUseException(_)
                ) =>
            {
                Ok(())
            }
            Err(err) => Err(LockError::Schema(Box::new(err))),
        }
    }
}

impl LeaseStore for DynamoLeaseStore {
    #[instrument(
        skip(self),
        fields(
            lock.resource = %resource,
            table = %self.table_name,
            backend = "dynamodb",
            lease_ms = lease_duration.as_millis() as u64,
        )
    )]
    async fn try_acquire(
        &self,
        resource: &str,
        owner: &str,
        lease_duration: Duration,
    ) -> LockResult<bool> {
        let now = self.clock.epoch_millis();
        let expires_at = now + lease_duration.as_millis() as u64;

        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item(ATTR_RESOURCE, AttributeValue::S(resource.to_string()))
            .item(ATTR_EXPIRES_AT, AttributeValue::N(expires_at.to_string()))
            .item(ATTR_OWNER, AttributeValue::S(owner.to_string()))
            .condition_expression(ACQUIRE_CONDITION)
            .expression_attribute_names("#r", ATTR_RESOURCE)
            .expression_attribute_names("#e", ATTR_EXPIRES_AT)
            .expression_attribute_values(":now", AttributeValue::N(now.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => {
                Span::current().record("acquired", true);
                Ok(true)
            }
            Err(err) if is_put_conditional_check_failed(&err) => {
                Span::current().record("acquired", false);
                Span::current().record("reason", "lock_held");
                Ok(false)
            }
            Err(err) => {
                Span::current().record("acquired", false);
                Err(classify_sdk_error(err))
            }
        }
    }

    #[instrument(
        skip(self),
        fields(lock.resource = %resource, table = %self.table_name, backend = "dynamodb")
    )]
    async fn release(&self, resource: &str, owner: &str) -> LockResult<()> {
        let result = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(ATTR_RESOURCE, AttributeValue::S(resource.to_string()))
            .condition_expression(RELEASE_CONDITION)
            .expression_attribute_names("#r", ATTR_RESOURCE)
            .expression_attribute_names("#o", ATTR_OWNER)
            .expression_attribute_values(":owner", AttributeValue::S(owner.to_string()))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            // The row is owned by a later acquirer; leave it in place.
            Err(err) if is_delete_conditional_check_failed(&err) => {
                tracing::debug!(resource, "lease already replaced; release is a no-op");
                Ok(())
            }
            Err(err) => Err(classify_sdk_error(err)),
        }
    }

    #[instrument(skip(self), fields(table = %self.table_name, backend = "dynamodb"))]
    async fn ensure_schema(&self) -> LockResult<()> {
        if self.table_exists().await? {
            return Ok(());
        }
        self.create_table().await
    }
}
