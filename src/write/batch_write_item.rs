use crate::common;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde::Serialize;
use serde_dynamo::{Error, Result, to_item};

/// Maximum number of write requests DynamoDB accepts in one batch.
pub const MAX_REQUESTS_PER_BATCH: usize = 25;

/// A single request within a batch write operation.
#[derive(Clone, Debug, PartialEq)]
pub enum BatchWriteItemRequest<T> {
    /// Create or replace an item.
    PutItem(T),
    /// Remove the item with the given key.
    DeleteItem(common::key::Key),
}

/// Serialized form of a single request, ready to be wrapped into a `WriteRequest`.
#[derive(Clone, Debug, PartialEq)]
enum WriteRequestInput {
    Put(std::collections::HashMap<String, types::AttributeValue>),
    Delete(std::collections::HashMap<String, types::AttributeValue>),
}

impl<T: Serialize> TryFrom<BatchWriteItemRequest<T>> for WriteRequestInput {
    type Error = Error;

    fn try_from(write_request: BatchWriteItemRequest<T>) -> Result<Self> {
        let request = match write_request {
            BatchWriteItemRequest::PutItem(item) => Self::Put(to_item(item)?),
            BatchWriteItemRequest::DeleteItem(key) => Self::Delete(key.try_into()?),
        };
        Ok(request)
    }
}

impl WriteRequestInput {
    fn build(self) -> std::result::Result<types::WriteRequest, error::BuildError> {
        let builder = match self {
            Self::Put(item) => {
                let put_request = types::PutRequest::builder().set_item(Some(item)).build()?;
                types::WriteRequest::builder().put_request(put_request)
            }
            Self::Delete(key) => {
                let delete_request = types::DeleteRequest::builder().set_key(Some(key)).build()?;
                types::WriteRequest::builder().delete_request(delete_request)
            }
        };
        Ok(builder.build())
    }
}

/// batch write item operation
#[derive(Clone, Debug, PartialEq)]
struct BatchWriteItemInput {
    chunks: Vec<Vec<WriteRequestInput>>,
    table_name: String,
}

/// Batch write item operation over a single table.
///
/// Requests are split into chunks of [`MAX_REQUESTS_PER_BATCH`]; requests
/// DynamoDB reports as unprocessed are sent again with exponential backoff, a
/// bounded number of times.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use member_repository::{common, entity::Team, write};
/// use uuid::Uuid;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let batch_write = write::batch_write_item::BatchWriteItem::<Team> {
///     requests: vec![write::batch_write_item::BatchWriteItemRequest::DeleteItem(
///         common::key::Key::from(Uuid::nil()),
///     )],
///     table_name: "team".to_string(),
/// };
/// let output = batch_write.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BatchWriteItem<T> {
    /// The requests to execute.
    pub requests: Vec<BatchWriteItemRequest<T>>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<BatchWriteItem<T>> for BatchWriteItemInput {
    type Error = Error;

    fn try_from(batch_write_item: BatchWriteItem<T>) -> Result<Self> {
        let mut chunks =
            Vec::with_capacity(batch_write_item.requests.len().div_ceil(MAX_REQUESTS_PER_BATCH));
        let mut chunk = Vec::new();
        for request in batch_write_item.requests {
            chunk.push(request.try_into()?);
            if chunk.len() == MAX_REQUESTS_PER_BATCH {
                chunks.push(std::mem::take(&mut chunk));
            }
        }
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
        let operation = Self {
            chunks,
            table_name: batch_write_item.table_name,
        };
        Ok(operation)
    }
}

impl<T: Serialize> BatchWriteItem<T> {
    /// Execute the batch write item operation.
    ///
    /// Requests still unprocessed after [`MAX_ATTEMPTS`](common::backoff::MAX_ATTEMPTS)
    /// attempts of a chunk are returned in `unprocessed_items` under the table name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "member_repository.batch_write_item",
            skip(self),
            fields(table_name = %self.table_name, requests = self.requests.len()),
            err
        )
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::batch_write_item::BatchWriteItemOutput,
        error::SdkError<operation::batch_write_item::BatchWriteItemError>,
    > {
        let batch_write_item: BatchWriteItemInput =
            self.try_into().map_err(error::BuildError::other)?;
        let table_name = batch_write_item.table_name;
        let mut unprocessed = Vec::new();
        for chunk in batch_write_item.chunks {
            let mut pending = Vec::with_capacity(chunk.len());
            for request in chunk {
                pending.push(request.build()?);
            }
            let mut attempt = 0;
            loop {
                let output = client
                    .batch_write_item()
                    .request_items(table_name.clone(), pending)
                    .send()
                    .await?;
                pending = output
                    .unprocessed_items
                    .and_then(|mut unprocessed| unprocessed.remove(&table_name))
                    .unwrap_or_default();
                if pending.is_empty() || attempt + 1 >= common::backoff::MAX_ATTEMPTS {
                    break;
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(unprocessed = pending.len(), attempt, "retrying unprocessed writes");
                common::backoff::wait(client, attempt).await;
                attempt += 1;
            }
            unprocessed.extend(pending);
        }
        let mut output = operation::batch_write_item::BatchWriteItemOutput::builder();
        if !unprocessed.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::warn!(unprocessed = unprocessed.len(), "writes left unprocessed");
            output = output.unprocessed_items(table_name, unprocessed);
        }
        Ok(output.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Team;

    use aws_smithy_mocks::{RuleMode, mock, mock_client};
    use rstest::rstest;
    use std::collections;
    use uuid::Uuid;

    #[rstest]
    #[case::empty(0, 0)]
    #[case::one_chunk(25, 1)]
    #[case::two_chunks(26, 2)]
    #[case::four_chunks(100, 4)]
    fn test_chunks(#[case] requests: u128, #[case] expected: usize) {
        let batch_write_item = BatchWriteItem::<Team> {
            requests: (0..requests)
                .map(|value| {
                    BatchWriteItemRequest::DeleteItem(common::key::Key::from(Uuid::from_u128(
                        value,
                    )))
                })
                .collect(),
            table_name: "a".to_string(),
        };
        let actual: BatchWriteItemInput = batch_write_item.try_into().unwrap();
        assert_eq!(actual.chunks.len(), expected);
    }

    #[test]
    fn test_put_and_delete() {
        let team = Team {
            id: Uuid::from_u128(1),
            name: "teamA".to_string(),
        };
        let batch_write_item = BatchWriteItem {
            requests: vec![
                BatchWriteItemRequest::PutItem(team),
                BatchWriteItemRequest::DeleteItem(common::key::Key::from(Uuid::from_u128(2))),
            ],
            table_name: "team".to_string(),
        };
        let actual: BatchWriteItemInput = batch_write_item.try_into().unwrap();
        assert_eq!(
            actual,
            BatchWriteItemInput {
                chunks: vec![vec![
                    WriteRequestInput::Put(collections::HashMap::from([
                        (
                            "id".to_string(),
                            types::AttributeValue::S(
                                "00000000-0000-0000-0000-000000000001".to_string()
                            ),
                        ),
                        (
                            "name".to_string(),
                            types::AttributeValue::S("teamA".to_string()),
                        ),
                    ])),
                    WriteRequestInput::Delete(collections::HashMap::from([(
                        "id".to_string(),
                        types::AttributeValue::S(
                            "00000000-0000-0000-0000-000000000002".to_string()
                        ),
                    )])),
                ]],
                table_name: "team".to_string(),
            }
        );
    }

    #[test]
    fn test_write_request_build() {
        let request = WriteRequestInput::Delete(collections::HashMap::from([(
            "id".to_string(),
            types::AttributeValue::S("x".to_string()),
        )]));
        let actual = request.build().unwrap();
        assert!(actual.delete_request.is_some());
        assert!(actual.put_request.is_none());
    }

    fn delete_request(value: u128) -> types::WriteRequest {
        WriteRequestInput::Delete(
            common::key::Key::from(Uuid::from_u128(value))
                .try_into()
                .unwrap(),
        )
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn test_unprocessed_writes_are_retried_a_bounded_number_of_times() {
        let rule = mock!(Client::batch_write_item)
            .sequence()
            .output(|| {
                operation::batch_write_item::BatchWriteItemOutput::builder()
                    .unprocessed_items("team", vec![delete_request(2)])
                    .build()
            })
            .times(common::backoff::MAX_ATTEMPTS as usize)
            .build();
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::Sequential, [&rule]);
        let batch_write_item = BatchWriteItem::<Team> {
            requests: vec![
                BatchWriteItemRequest::DeleteItem(common::key::Key::from(Uuid::from_u128(1))),
                BatchWriteItemRequest::DeleteItem(common::key::Key::from(Uuid::from_u128(2))),
            ],
            table_name: "team".to_string(),
        };
        let output = batch_write_item.send(&client).await.unwrap();
        assert_eq!(rule.num_calls(), common::backoff::MAX_ATTEMPTS as usize);
        assert_eq!(output.unprocessed_items.unwrap()["team"], vec![delete_request(2)]);
    }

    #[tokio::test]
    async fn test_processed_writes_leave_nothing_behind() {
        let rule = mock!(Client::batch_write_item)
            .then_output(|| operation::batch_write_item::BatchWriteItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::Sequential, [&rule]);
        let batch_write_item = BatchWriteItem {
            requests: vec![BatchWriteItemRequest::PutItem(Team::new("teamA"))],
            table_name: "team".to_string(),
        };
        let output = batch_write_item.send(&client).await.unwrap();
        assert_eq!(rule.num_calls(), 1);
        assert_eq!(output.unprocessed_items, None);
    }
}
