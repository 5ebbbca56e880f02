use crate::{common, predicate::Operand};

use aws_sdk_dynamodb::{Client, error, operation, types};
use indexmap::IndexMap;
use serde_dynamo::{Error, Result, to_attribute_value};
use std::collections;

/// update item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct UpdateItemInput {
    condition_expression: String,
    expression_attribute_names: Option<collections::HashMap<String, String>>,
    expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    key: collections::HashMap<String, types::AttributeValue>,
    table_name: String,
    update_expression: String,
}

/// Changes applied by an update.
///
/// `set` assigns values; `add` increments numeric attributes by the given amount.
///
/// ```rust
/// use member_repository::{predicate::Operand, write::update_item::UpdateExpression};
///
/// let update = UpdateExpression::default()
///     .set("username", "anonymous")
///     .add("age", 1);
/// assert_eq!(update.add.get("age"), Some(&Operand::Integer(1)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateExpression {
    /// Attributes to assign.
    pub set: IndexMap<String, Operand>,
    /// Numeric attributes to increment.
    pub add: IndexMap<String, Operand>,
}

impl UpdateExpression {
    /// Assign `value` to `name`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.set.insert(name.into(), value.into());
        self
    }

    /// Increment `name` by `value`.
    pub fn add(mut self, name: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.add.insert(name.into(), value.into());
        self
    }

    fn get_clause_operation(
        values: IndexMap<String, Operand>,
        keyword: &str,
        separator: &str,
        suffix: &str,
        index: &mut usize,
    ) -> Result<common::ExpressionInput> {
        let mut operations = Vec::with_capacity(values.len());
        for (name, value) in values {
            let name_placeholder = format!("#{name}");
            let value_placeholder = format!(":{name}_{suffix}{index}");
            *index += 1;
            let value = to_attribute_value(value)?;
            operations.push(common::ExpressionInput {
                expression: format!("{name_placeholder}{separator}{value_placeholder}"),
                expression_attribute_names: collections::HashMap::from([(name_placeholder, name)]),
                expression_attribute_values: collections::HashMap::from([(
                    value_placeholder,
                    value,
                )]),
            });
        }
        let mut operation = common::ExpressionInput::merge(", ", operations);
        if !operation.expression.is_empty() {
            operation.expression = format!("{keyword} {}", operation.expression);
        }
        Ok(operation)
    }
}

impl TryFrom<UpdateExpression> for common::ExpressionInput {
    type Error = Error;

    fn try_from(update_expression: UpdateExpression) -> Result<Self> {
        let mut index = 0;
        let set = UpdateExpression::get_clause_operation(
            update_expression.set,
            "SET",
            " = ",
            "set",
            &mut index,
        )?;
        let add = UpdateExpression::get_clause_operation(
            update_expression.add,
            "ADD",
            " ",
            "add",
            &mut index,
        )?;
        Ok(Self::merge(" ", vec![set, add]))
    }
}

/// Update item operation.
///
/// Only existing items are updated: the request carries an
/// `attribute_exists` condition on the key, so an item deleted in the
/// meantime is not recreated.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use member_repository::{common, write};
/// use uuid::Uuid;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let update_item = write::update_item::UpdateItem {
///     key: common::key::Key::from(Uuid::nil()),
///     table_name: "member".to_string(),
///     update_expression: write::update_item::UpdateExpression::default().add("age", 1),
/// };
/// update_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateItem {
    /// The key of the item to update.
    pub key: common::key::Key,
    /// The name of the table to write to.
    pub table_name: String,
    /// The changes to apply.
    pub update_expression: UpdateExpression,
}

impl TryFrom<UpdateItem> for UpdateItemInput {
    type Error = Error;

    fn try_from(update_item: UpdateItem) -> Result<Self> {
        let key_placeholder = format!("#{}", update_item.key.name);
        let condition_expression = format!("attribute_exists({key_placeholder})");
        let mut expression_attribute_names = Some(collections::HashMap::from([(
            key_placeholder,
            update_item.key.name.clone(),
        )]));
        let mut expression_attribute_values = None;
        let key = update_item.key.try_into()?;
        let update_operation: common::ExpressionInput = update_item.update_expression.try_into()?;
        let update_expression = update_operation.merge_into(
            &mut expression_attribute_names,
            &mut expression_attribute_values,
        );
        let operation = Self {
            condition_expression,
            expression_attribute_names,
            expression_attribute_values,
            key,
            table_name: update_item.table_name,
            update_expression,
        };
        Ok(operation)
    }
}

impl UpdateItem {
    /// Execute the update item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "member_repository.update_item", err)
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> std::result::Result<
        operation::update_item::UpdateItemOutput,
        error::SdkError<operation::update_item::UpdateItemError>,
    > {
        let update_item: UpdateItemInput = self.try_into().map_err(error::BuildError::other)?;
        client
            .update_item()
            .condition_expression(update_item.condition_expression)
            .set_expression_attribute_names(update_item.expression_attribute_names)
            .set_expression_attribute_values(update_item.expression_attribute_values)
            .set_key(Some(update_item.key))
            .table_name(update_item.table_name)
            .update_expression(update_item.update_expression)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case::set(
        UpdateExpression::default().set("username", "anonymous"),
        common::ExpressionInput {
            expression: "SET #username = :username_set0".to_string(),
            expression_attribute_names: collections::HashMap::from(
                [("#username".to_string(), "username".to_string())]
            ),
            expression_attribute_values: collections::HashMap::from(
                [(
                    ":username_set0".to_string(),
                    types::AttributeValue::S(
                        "anonymous".to_string()
                    ),
                )]
            ),
        }
    )]
    #[case::add(
        UpdateExpression::default().add("age", 1),
        common::ExpressionInput {
            expression: "ADD #age :age_add0".to_string(),
            expression_attribute_names: collections::HashMap::from(
                [("#age".to_string(), "age".to_string())]
            ),
            expression_attribute_values: collections::HashMap::from(
                [(
                    ":age_add0".to_string(),
                    types::AttributeValue::N(
                        "1".to_string()
                    ),
                )]
            ),
        }
    )]
    #[case::set_and_add(
        UpdateExpression::default()
            .set("username", "a")
            .set("team_id", Uuid::nil())
            .add("age", -2),
        common::ExpressionInput {
            expression: "SET #username = :username_set0, #team_id = :team_id_set1 ADD #age :age_add2".to_string(),
            expression_attribute_names: collections::HashMap::from(
                [
                    ("#username".to_string(), "username".to_string()),
                    ("#team_id".to_string(), "team_id".to_string()),
                    ("#age".to_string(), "age".to_string()),
                ]
            ),
            expression_attribute_values: collections::HashMap::from(
                [
                    (
                        ":username_set0".to_string(),
                        types::AttributeValue::S(
                            "a".to_string()
                        ),
                    ),
                    (
                        ":team_id_set1".to_string(),
                        types::AttributeValue::S(
                            "00000000-0000-0000-0000-000000000000".to_string()
                        ),
                    ),
                    (
                        ":age_add2".to_string(),
                        types::AttributeValue::N(
                            "-2".to_string()
                        ),
                    ),
                ]
            ),
        }
    )]
    fn test_update_expression(
        #[case] update_expression: UpdateExpression,
        #[case] expected: common::ExpressionInput,
    ) {
        let actual: common::ExpressionInput = update_expression.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_update_item() {
        let update_item = UpdateItem {
            key: common::key::Key::from(Uuid::nil()),
            table_name: "member".to_string(),
            update_expression: UpdateExpression::default().set("username", "anonymous"),
        };
        let actual: UpdateItemInput = update_item.try_into().unwrap();
        assert_eq!(
            actual,
            UpdateItemInput {
                condition_expression: "attribute_exists(#id)".to_string(),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#id".to_string(), "id".to_string()),
                            ("#username".to_string(), "username".to_string()),
                        ]
                    )
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [(
                            ":username_set0".to_string(),
                            types::AttributeValue::S(
                                "anonymous".to_string()
                            ),
                        )]
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
                table_name: "member".to_string(),
                update_expression: "SET #username = :username_set0".to_string(),
            }
        );
    }
}
