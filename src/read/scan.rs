use crate::read;

use aws_sdk_dynamodb::{Client, error, operation, types};
use serde_dynamo::{Error, Result};

/// scan operation
#[derive(Clone, Debug, Default, PartialEq)]
struct ScanInput {
    read_operation: read::common::ReadInput,
    select: Option<types::Select>,
}

/// Scan operation, following pagination until the table is exhausted.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use member_repository::{predicate, predicate::filter::Filter, read};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let scan = read::scan::Scan {
///     read_args: read::common::ReadArgs {
///         filter: Filter::all_of([predicate::age_goe(Some(20))]),
///         table_name: "member".to_string(),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let output = scan.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scan {
    /// Read arguments (table name, filter, selection).
    pub read_args: read::common::ReadArgs,
    /// What to return. `Select::Count` returns only the number of matching items.
    pub select: Option<types::Select>,
}

impl TryFrom<Scan> for ScanInput {
    type Error = Error;

    fn try_from(scan: Scan) -> Result<Self> {
        let read_operation: read::common::ReadInput = scan.read_args.try_into()?;
        let operation = Self {
            read_operation,
            select: scan.select,
        };
        Ok(operation)
    }
}

impl Scan {
    /// Execute the scan operation.
    ///
    /// Items and counts of every page are aggregated into a single output.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.scan", err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<operation::scan::ScanOutput, error::SdkError<operation::scan::ScanError>>
    {
        let scan: ScanInput = self.try_into().map_err(error::BuildError::other)?;
        let read_operation = scan.read_operation;
        let mut paginator = client
            .scan()
            .set_consistent_read(read_operation.consistent_read)
            .set_expression_attribute_names(read_operation.expression_attribute_names)
            .set_expression_attribute_values(read_operation.expression_attribute_values)
            .set_filter_expression(read_operation.filter_expression)
            .set_projection_expression(read_operation.projection_expression)
            .set_select(scan.select)
            .table_name(read_operation.table_name)
            .into_paginator()
            .send();
        let mut items = Vec::new();
        let mut count = 0;
        let mut scanned_count = 0;
        while let Some(page) = paginator.next().await {
            let page = page?;
            if let Some(page_items) = page.items {
                items.extend(page_items);
            }
            count += page.count;
            scanned_count += page.scanned_count;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(count, scanned_count, "scan finished");
        let output = operation::scan::ScanOutput::builder()
            .set_items(Some(items))
            .count(count)
            .scanned_count(scanned_count)
            .build();
        Ok(output)
    }
}
