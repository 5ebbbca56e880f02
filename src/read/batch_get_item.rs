use crate::common;

use aws_sdk_dynamodb::{Client, error, operation, types};
use indexmap::IndexSet;
use serde_dynamo::{Error, Result};
use std::collections;

/// Maximum number of keys DynamoDB accepts in one batch get request.
pub const MAX_KEYS_PER_REQUEST: usize = 100;

type Item = collections::HashMap<String, types::AttributeValue>;

/// batch get item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct BatchGetItemInput {
    chunks: Vec<Vec<Item>>,
    consistent_read: Option<bool>,
    table_name: String,
}

/// Batch get item operation over a single table.
///
/// Duplicate keys are sent once and requests are split into chunks of
/// [`MAX_KEYS_PER_REQUEST`]. Keys DynamoDB reports as unprocessed are requested
/// again with exponential backoff, a bounded number of times.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use member_repository::{common, read};
/// use uuid::Uuid;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let batch_get = read::batch_get_item::BatchGetItem {
///     keys: vec![common::key::Key::from(Uuid::nil())],
///     table_name: "team".to_string(),
///     ..Default::default()
/// };
/// let output = batch_get.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetItem {
    /// Whether to use strongly consistent reads.
    pub consistent_read: Option<bool>,
    /// The keys of the items to retrieve.
    pub keys: Vec<common::key::Key>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl TryFrom<BatchGetItem> for BatchGetItemInput {
    type Error = Error;

    fn try_from(batch_get_item: BatchGetItem) -> Result<Self> {
        let keys: IndexSet<common::key::Key> = batch_get_item.keys.into_iter().collect();
        let mut chunks = Vec::with_capacity(keys.len().div_ceil(MAX_KEYS_PER_REQUEST));
        let mut chunk = Vec::with_capacity(MAX_KEYS_PER_REQUEST.min(keys.len()));
        for key in keys {
            chunk.push(key.try_into()?);
            if chunk.len() == MAX_KEYS_PER_REQUEST {
                chunks.push(std::mem::take(&mut chunk));
            }
        }
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        let operation = Self {
            chunks,
            consistent_read: batch_get_item.consistent_read,
            table_name: batch_get_item.table_name,
        };
        Ok(operation)
    }
}

impl BatchGetItem {
    /// Execute the batch get item operation.
    ///
    /// Every item found is returned in `responses` under the table name. Keys
    /// still unprocessed after [`MAX_ATTEMPTS`](common::backoff::MAX_ATTEMPTS)
    /// requests of a chunk are returned in `unprocessed_keys`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.batch_get_item", err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::batch_get_item::BatchGetItemOutput,
        error::SdkError<operation::batch_get_item::BatchGetItemError>,
    > {
        let batch_get_item: BatchGetItemInput =
            self.try_into().map_err(error::BuildError::other)?;
        let table_name = batch_get_item.table_name;
        let mut items = Vec::new();
        let mut unprocessed = Vec::new();
        for chunk in batch_get_item.chunks {
            let mut pending = chunk;
            let mut attempt = 0;
            loop {
                let keys_and_attributes = types::KeysAndAttributes::builder()
                    .set_consistent_read(batch_get_item.consistent_read)
                    .set_keys(Some(pending))
                    .build()?;
                let output = client
                    .batch_get_item()
                    .request_items(table_name.clone(), keys_and_attributes)
                    .send()
                    .await?;
                if let Some(mut responses) = output.responses {
                    items.extend(responses.remove(&table_name).unwrap_or_default());
                }
                pending = output
                    .unprocessed_keys
                    .and_then(|mut unprocessed| unprocessed.remove(&table_name))
                    .map(|keys_and_attributes| keys_and_attributes.keys)
                    .unwrap_or_default();
                if pending.is_empty() || attempt + 1 >= common::backoff::MAX_ATTEMPTS {
                    break;
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(unprocessed = pending.len(), attempt, "retrying unprocessed keys");
                common::backoff::wait(client, attempt).await;
                attempt += 1;
            }
            unprocessed.extend(pending);
        }
        let mut output = operation::batch_get_item::BatchGetItemOutput::builder()
            .responses(table_name.clone(), items);
        if !unprocessed.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(unprocessed = unprocessed.len(), "keys left unprocessed");
            let keys_and_attributes = types::KeysAndAttributes::builder()
                .set_consistent_read(batch_get_item.consistent_read)
                .set_keys(Some(unprocessed))
                .build()?;
            output = output.unprocessed_keys(table_name, keys_and_attributes);
        }
        Ok(output.build())
    }
}
