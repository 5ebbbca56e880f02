//! Error type shared by every repository operation.
//!
//! Failures are passed through from DynamoDB or from item (de)serialization.
//! "Not found" is never an error: single-item lookups return `Ok(None)`.

use aws_sdk_dynamodb::{error, operation};
use thiserror::Error;

/// Errors raised while talking to DynamoDB or converting items.
#[derive(Debug, Error)]
pub enum Error {
    /// An item could not be converted to or from DynamoDB attribute values.
    #[error("item conversion failed: {0}")]
    Conversion(#[from] serde_dynamo::Error),
    /// A batch get item request failed.
    #[error("batch get item failed: {0}")]
    BatchGetItem(#[from] error::SdkError<operation::batch_get_item::BatchGetItemError>),
    /// A batch write item request failed.
    #[error("batch write item failed: {0}")]
    BatchWriteItem(#[from] error::SdkError<operation::batch_write_item::BatchWriteItemError>),
    /// A get item request failed.
    #[error("get item failed: {0}")]
    GetItem(#[from] error::SdkError<operation::get_item::GetItemError>),
    /// A put item request failed.
    #[error("put item failed: {0}")]
    PutItem(#[from] error::SdkError<operation::put_item::PutItemError>),
    /// A scan request failed.
    #[error("scan failed: {0}")]
    Scan(#[from] error::SdkError<operation::scan::ScanError>),
    /// A batch request still had unprocessed entries after its last retry.
    #[error("{count} entries of table {table_name} left unprocessed")]
    Unprocessed {
        /// The table the entries belong to.
        table_name: String,
        /// How many entries were left.
        count: usize,
    },
    /// An update item request failed.
    #[error("update item failed: {0}")]
    UpdateItem(#[from] error::SdkError<operation::update_item::UpdateItemError>),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
