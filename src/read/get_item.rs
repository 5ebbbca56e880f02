use crate::common;

use aws_sdk_dynamodb::{Client, error, operation};
use serde_dynamo::{Error, Result};
use std::collections;

/// get item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct GetItemInput {
    consistent_read: Option<bool>,
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    key: collections::HashMap<String, aws_sdk_dynamodb::types::AttributeValue>,
    projection_expression: Option<String>,
    table_name: String,
}

/// Get item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use member_repository::{common, read};
/// use uuid::Uuid;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let get_item = read::get_item::GetItem {
///     key: common::key::Key::from(Uuid::nil()),
///     consistent_read: None,
///     selection: None,
///     table_name: "member".to_string(),
/// };
/// get_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct GetItem {
    /// The key of the item to retrieve.
    pub key: common::key::Key,
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Which attributes to retrieve. `None` retrieves all attributes.
    pub selection: Option<common::selection::Selection>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl TryFrom<GetItem> for GetItemInput {
    type Error = Error;

    fn try_from(get_item: GetItem) -> Result<Self> {
        let key = get_item.key.try_into()?;
        let (expression_attribute_names, projection_expression) =
            match get_item.selection.filter(|selection| !selection.is_empty()) {
                Some(selection) => {
                    let selection_operation: common::ExpressionInput = selection.into();
                    (
                        Some(selection_operation.expression_attribute_names),
                        Some(selection_operation.expression),
                    )
                }
                None => (None, None),
            };
        let operation = Self {
            consistent_read: get_item.consistent_read,
            expression_attribute_names,
            key,
            projection_expression,
            table_name: get_item.table_name,
        };
        Ok(operation)
    }
}

impl GetItem {
    /// Execute the get item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.get_item", err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::get_item::GetItemOutput,
        error::SdkError<operation::get_item::GetItemError>,
    > {
        let get_item: GetItemInput = self.try_into().map_err(error::BuildError::other)?;
        client
            .get_item()
            .set_consistent_read(get_item.consistent_read)
            .set_expression_attribute_names(get_item.expression_attribute_names)
            .set_key(Some(get_item.key))
            .set_projection_expression(get_item.projection_expression)
            .table_name(get_item.table_name)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_dynamodb::types;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case::empty(
        GetItem {
            key: common::key::Key::from(Uuid::nil()),
            consistent_read: None,
            selection: None,
            table_name: "a".to_string(),
        },
        GetItemInput {
            key: collections::HashMap::from(
                [(
                    "id".to_string(),
                    types::AttributeValue::S(
                        "00000000-0000-0000-0000-000000000000".to_string()
                    ),
                )]
            ),
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::full(
        GetItem {
            key: common::key::Key::from(Uuid::nil()),
            consistent_read: Some(true),
            selection: Some(
                common::selection::Selection::from_iter(["username", "age"])
            ),
            table_name: "b".to_string(),
        },
        GetItemInput {
            consistent_read: Some(true),
            expression_attribute_names: Some(
                collections::HashMap::from(
                    [
                        ("#username".to_string(), "username".to_string()),
                        ("#age".to_string(), "age".to_string()),
                    ]
                )
            ),
            key: collections::HashMap::from(
                [(
                    "id".to_string(),
                    types::AttributeValue::S(
                        "00000000-0000-0000-0000-000000000000".to_string()
                    ),
                )]
            ),
            projection_expression: Some(
                "#username, #age".to_string()
            ),
            table_name: "b".to_string(),
        }
    )]
    fn test_get_item(#[case] args: GetItem, #[case] expected: GetItemInput) {
        let actual: GetItemInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
