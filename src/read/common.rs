use crate::{common, predicate::filter::Filter};

use aws_sdk_dynamodb::types;
use serde_dynamo::Result;
use std::collections;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) filter_expression: Option<String>,
    pub(crate) projection_expression: Option<String>,
    pub(crate) table_name: String,
}

/// Arguments shared by read operations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadArgs {
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// Filter applied to every item read. Only valid for scans.
    ///
    /// The filter must only reference attributes of the table being read.
    pub filter: Filter,
    /// Which attributes to retrieve. `None` retrieves all attributes.
    pub selection: Option<common::selection::Selection>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl TryFrom<ReadArgs> for ReadInput {
    type Error = serde_dynamo::Error;

    fn try_from(read_args: ReadArgs) -> Result<Self> {
        let mut operation = Self {
            consistent_read: read_args.consistent_read,
            table_name: read_args.table_name,
            ..Default::default()
        };
        let condition_operation: Option<common::ExpressionInput> = read_args.filter.try_into()?;
        if let Some(condition_operation) = condition_operation {
            let filter_expression = condition_operation.merge_into(
                &mut operation.expression_attribute_names,
                &mut operation.expression_attribute_values,
            );
            operation.filter_expression = Some(filter_expression);
        }
        if let Some(selection) = read_args.selection.filter(|selection| !selection.is_empty()) {
            let selection_operation: common::ExpressionInput = selection.into();
            let projection_expression = selection_operation.merge_into(
                &mut operation.expression_attribute_names,
                &mut operation.expression_attribute_values,
            );
            operation.projection_expression = Some(projection_expression);
        }
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{self, Clause, Field};

    use rstest::rstest;

    #[rstest]
    #[case::empty(
        ReadArgs {
            table_name: "a".to_string(),
            ..Default::default()
        },
        ReadInput {
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::empty_selection_ignored(
        ReadArgs {
            selection: Some(common::selection::Selection::default()),
            table_name: "a".to_string(),
            ..Default::default()
        },
        ReadInput {
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::full(
        ReadArgs {
            consistent_read: Some(true),
            filter: Filter::all_of(
                [
                    predicate::username_eq(Some("member1")),
                    Some(Clause::goe(Field::Age, 10)),
                ]
            ),
            selection: Some(
                common::selection::Selection::from_iter(["username", "team_id"])
            ),
            table_name: "member".to_string(),
        },
        ReadInput {
            consistent_read: Some(true),
            expression_attribute_names: Some(
                collections::HashMap::from(
                    [
                        ("#username".to_string(), "username".to_string()),
                        ("#age".to_string(), "age".to_string()),
                        ("#team_id".to_string(), "team_id".to_string()),
                    ]
                )
            ),
            expression_attribute_values: Some(
                collections::HashMap::from(
                    [
                        (
                            ":username_eq0".to_string(),
                            types::AttributeValue::S(
                                "member1".to_string()
                            )
                        ),
                        (
                            ":age_gte1".to_string(),
                            types::AttributeValue::N(
                                "10".to_string()
                            )
                        ),
                    ]
                )
            ),
            filter_expression: Some(
                "#username = :username_eq0 AND #age >= :age_gte1".to_string()
            ),
            projection_expression: Some(
                "#username, #team_id".to_string()
            ),
            table_name: "member".to_string(),
        }
    )]
    fn test_read_args(#[case] args: ReadArgs, #[case] expected: ReadInput) {
        let actual: ReadInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
